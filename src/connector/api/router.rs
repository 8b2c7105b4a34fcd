use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::RepositoryController;

pub struct Router<'a> {
    repository_controller: RepositoryController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            repository_controller: RepositoryController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Get { identifier, format } => {
                self.repository_controller.get(identifier, format).await
            }
            Commands::Exists { identifier } => self.repository_controller.exists(identifier).await,
        }
    }
}
