use actix_multipart::Multipart;
use actix_web::{get, http::header, http::StatusCode, post, web, HttpResponse};
use futures_util::TryStreamExt;
use uuid::Uuid;

use crate::api::{error, success};
use crate::modules::file_upload::{
    model::FileUploadForm,
    schema::{FileResponse, ReprocessResponse},
    service::FileUploadService,
    view::render_upload_form,
};
use crate::utils::read_field;

/// Form field carrying the upload.
const FILE_FIELD: &str = "file";

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status).content_type("text/html; charset=utf-8").body(body)
}

#[get("/")]
pub async fn upload_form() -> HttpResponse {
    html(StatusCode::OK, render_upload_form(&[]))
}

/// Accepts the multipart form, redirects back to the form on success and
/// re-renders it with errors otherwise.
#[post("/")]
pub async fn upload_file(
    mut payload: Multipart,
    service: web::Data<FileUploadService>,
) -> Result<HttpResponse, error::Error> {
    let limit = service.config().max_file_size;
    let mut form = FileUploadForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| error::Error::bad_request(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            read_field(&mut field, limit).await?;
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let content = read_field(&mut field, limit).await?;
        form = FileUploadForm::new(filename, content);

        if form.content.len() > limit {
            break;
        }
    }

    match service.upload_file(form).await {
        Ok(file) => {
            log::info!("Upload {} accepted", file.id);
            Ok(HttpResponse::SeeOther().insert_header((header::LOCATION, "/")).finish())
        }
        Err(error::SystemError::Validation(errors)) => {
            Ok(html(StatusCode::BAD_REQUEST, render_upload_form(&errors)))
        }
        Err(e) => Err(error::Error::from(e)),
    }
}

#[get("")]
pub async fn list_files(
    service: web::Data<FileUploadService>,
) -> Result<success::Success<Vec<FileResponse>>, error::Error> {
    let files = service.list_files().await?;
    let files = files.into_iter().map(FileResponse::from).collect();
    Ok(success::Success::ok(Some(files)))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_file(
    service: web::Data<FileUploadService>,
    file_id: web::Path<Uuid>,
) -> Result<success::Success<FileResponse>, error::Error> {
    match service.get_file(&file_id.into_inner()).await? {
        Some(file) => Ok(success::Success::ok(Some(FileResponse::from(file)))),
        None => Err(error::Error::not_found("File not found")),
    }
}

#[post("/{id:[0-9a-fA-F-]{36}}/reprocess")]
pub async fn reprocess_file(
    service: web::Data<FileUploadService>,
    file_id: web::Path<Uuid>,
) -> Result<success::Success<ReprocessResponse>, error::Error> {
    let file_id = file_id.into_inner();
    service.reprocess_file(&file_id).await?;
    Ok(success::Success::accepted(Some(ReprocessResponse { file_id }))
        .message("Metadata processing queued"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{test, App};

    use super::*;
    use crate::modules::file_upload::{model::UploadConfig, repository::FileRepository, route};
    use crate::modules::jobs::model::JobKind;
    use crate::test::{InMemoryFileRepository, RecordingQueue};

    const BOUNDARY: &str = "XuploaderBoundaryX";

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match filename {
                Some(f) => format!("form-data; name=\"{name}\"; filename=\"{f}\""),
                None => format!("form-data; name=\"{name}\""),
            };
            body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(content.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn post_form(parts: &[(&str, Option<&str>, &str)]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts))
    }

    fn service(
        dir: &tempfile::TempDir,
    ) -> (Arc<InMemoryFileRepository>, Arc<RecordingQueue>, FileUploadService) {
        let repo = Arc::new(InMemoryFileRepository::default());
        let queue = Arc::new(RecordingQueue::default());
        let config = UploadConfig { max_file_size: 4096, upload_dir: dir.path().to_path_buf() };
        let service = FileUploadService::new(repo.clone(), queue.clone(), config);
        (repo, queue, service)
    }

    #[actix_web::test]
    async fn get_renders_the_form() {
        let dir = tempfile::tempdir().unwrap();
        let (_, _, svc) = service(&dir);
        let app =
            test::init_service(App::new().app_data(web::Data::new(svc)).configure(route::configure))
                .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("<form"));
    }

    #[actix_web::test]
    async fn valid_upload_redirects_and_enqueues() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, queue, svc) = service(&dir);
        let app =
            test::init_service(App::new().app_data(web::Data::new(svc)).configure(route::configure))
                .await;

        let req = post_form(&[
            ("title", None, "quarterly"),
            ("file", Some("report.pdf"), "%PDF-1.4 data"),
        ])
        .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

        let files = repo.list_all().await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].file.ends_with("/report.pdf"));
        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].kind, JobKind::ExtractMetadata { file_id: files[0].id });
    }

    #[actix_web::test]
    async fn missing_file_rerenders_form_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, queue, svc) = service(&dir);
        let app =
            test::init_service(App::new().app_data(web::Data::new(svc)).configure(route::configure))
                .await;

        let resp = test::call_service(&app, post_form(&[("title", None, "no file")]).to_request())
            .await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("This field is required."));
        assert!(repo.list_all().await.unwrap().is_empty());
        assert!(queue.jobs().is_empty());
    }

    #[actix_web::test]
    async fn read_endpoints_and_reprocess() {
        let dir = tempfile::tempdir().unwrap();
        let (repo, queue, svc) = service(&dir);
        let app =
            test::init_service(App::new().app_data(web::Data::new(svc)).configure(route::configure))
                .await;
        test::call_service(&app, post_form(&[("file", Some("a.txt"), "hello")]).to_request())
            .await;
        let id = repo.list_all().await.unwrap()[0].id;

        let list: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/files").to_request(),
        )
        .await;
        assert_eq!(list["data"].as_array().map(Vec::len), Some(1));

        let one: serde_json::Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri(&format!("/files/{id}")).to_request(),
        )
        .await;
        assert_eq!(one["data"]["id"], id.to_string());
        assert!(one["data"]["metadata"].is_null());

        let resp = test::call_service(
            &app,
            test::TestRequest::post().uri(&format!("/files/{id}/reprocess")).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(queue.jobs().len(), 2);

        let missing = test::call_service(
            &app,
            test::TestRequest::get().uri(&format!("/files/{}", Uuid::now_v7())).to_request(),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
