use std::ops::Deref;

use crate::manager::ConnectionManager;

/// A single-use handle owned by exactly one worker at a time. Releasing
/// the outstanding-handle count happens on drop, regardless of how the
/// connection went out of scope.
pub struct Connection {
    client: tokio_postgres::Client,
    manager: ConnectionManager,
}

impl Connection {
    pub(crate) fn new(client: tokio_postgres::Client, manager: ConnectionManager) -> Self {
        Self { client, manager }
    }

    pub fn client(&self) -> &tokio_postgres::Client {
        &self.client
    }
}

impl Deref for Connection {
    type Target = tokio_postgres::Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.manager.release();
    }
}
