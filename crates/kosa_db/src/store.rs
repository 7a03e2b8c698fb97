//! All repositories over one pool.

use crate::error::DbError;
use crate::repositories::{
    AppointmentRepository, BarberRepository, ClientRepository, ServiceRepository,
    SqlAppointmentRepository, SqlBarberRepository, SqlClientRepository, SqlServiceRepository,
};
use crate::DbClient;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Store {
    pub appointments: SqlAppointmentRepository,
    pub barbers: SqlBarberRepository,
    pub services: SqlServiceRepository,
    pub clients: SqlClientRepository,
    db_client: DbClient,
}

impl Store {
    pub fn new(db_client: DbClient) -> Self {
        Self {
            appointments: SqlAppointmentRepository::new(db_client.clone()),
            barbers: SqlBarberRepository::new(db_client.clone()),
            services: SqlServiceRepository::new(db_client.clone()),
            clients: SqlClientRepository::new(db_client.clone()),
            db_client,
        }
    }

    /// Connect to `url` and create every table. Used by tests with `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let store = Self::new(DbClient::from_url(url).await?);
        store.init_schema().await?;
        Ok(store)
    }

    pub async fn init_schema(&self) -> Result<(), DbError> {
        self.barbers.init_schema().await?;
        self.services.init_schema().await?;
        self.clients.init_schema().await?;
        self.appointments.init_schema().await?;
        info!("Database schema ready");
        Ok(())
    }

    pub fn client(&self) -> &DbClient {
        &self.db_client
    }
}
