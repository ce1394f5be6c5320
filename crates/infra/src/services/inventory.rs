use chariot_inventory::{Catalog, InventoryItem};

use super::{ChariotServices, ServiceResult};
use crate::store::fetch_all;

impl ChariotServices {
    /// Current inventory, deduplicated and sorted by id.
    pub async fn catalog(&self) -> ServiceResult<Catalog> {
        let items = fetch_all::<InventoryItem>(self.store()).await?;
        Ok(Catalog::new(items))
    }
}
