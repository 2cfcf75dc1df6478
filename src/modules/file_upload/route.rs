use crate::modules::file_upload::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(upload_form).service(upload_file).service(
        scope("/files").service(list_files).service(get_file).service(reprocess_file),
    );
}
