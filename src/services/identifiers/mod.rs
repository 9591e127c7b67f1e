pub mod sync;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::identifiers::requests::SyncIdentifiersRequest;

pub use sync::sync_school_identifiers;

crate::services::define_service!(IdentifierService);

impl IdentifierService {
    // 学校后缀变更后同步全校登录标识
    pub async fn sync_identifiers(
        &self,
        request: &HttpRequest,
        sync_request: SyncIdentifiersRequest,
    ) -> ActixResult<HttpResponse> {
        sync::handle_sync_identifiers(self, request, sync_request).await
    }
}
