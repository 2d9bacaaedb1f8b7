//! End-to-end command workflows against a mocked service.
//!
//! These tests don't spawn the binary. They drive the same business calls the commands
//! make, in the same order, and check what reaches the wire.

use cabinet_business::{
    ApiClient, AuthSession, BusinessConfig, DeleteOutcome, FileManager, ManagedFile,
    RemoteBlobStore, RemoteCatalog, RemoteIdentity, UploadFile,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, path_regex},
};

const TOKEN: &str = "session-token";

async fn mock_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/sign-in"))
        .and(body_partial_json(json!({ "email": "a@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": TOKEN,
            "user_id": "u1",
            "email": "a@example.com",
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn stored(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "category": "documents",
        "size": 5,
        "url": format!("http://files.test/v1/download/{id}"),
        "user_id": "u1",
        "storage_path": format!("files/u1/{id}-{name}"),
    })
}

struct Cli {
    session: AuthSession<RemoteIdentity>,
    client: ApiClient,
}

impl Cli {
    fn new(server: &MockServer) -> Self {
        let client = ApiClient::new(&BusinessConfig::new(server.uri()));
        Self {
            session: AuthSession::new(RemoteIdentity::new(client.clone())),
            client,
        }
    }

    async fn signed_in_manager(&self) -> FileManager<RemoteCatalog, RemoteBlobStore> {
        let identity = self
            .session
            .sign_in("a@example.com", "hunter22")
            .await
            .expect("sign-in succeeds");
        FileManager::new(
            identity,
            RemoteCatalog::new(self.client.clone()),
            RemoteBlobStore::new(self.client.clone()),
        )
    }
}

#[tokio::test]
async fn test_signin_then_upload_sends_bearer_token() {
    let server = MockServer::start().await;
    mock_sign_in(&server).await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/v1/blobs/files/u1/[^/]+-notes\.txt$"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(header("content-type", "text/plain"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/blob-urls"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "url": "http://files.test/v1/download/t" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .and(body_partial_json(json!({
            "name": "notes.txt",
            "category": "documents",
            "user_id": "u1",
            "url": "http://files.test/v1/download/t",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(stored("f1", "notes.txt")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/files"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "files": [stored("f1", "notes.txt")] })),
        )
        .mount(&server)
        .await;

    let cli = Cli::new(&server);
    let manager = cli.signed_in_manager().await;
    assert_eq!(cli.client.token().as_deref(), Some(TOKEN));

    let report = manager
        .upload(vec![UploadFile::new("notes.txt", "text/plain", b"hello".to_vec())])
        .await;

    assert!(report.is_complete());
    assert_eq!(report.uploaded.len(), 1);
    let names: Vec<String> = manager.files().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["notes.txt"]);
}

#[tokio::test]
async fn test_ls_then_rm_with_yes() {
    let server = MockServer::start().await;
    mock_sign_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [stored("f2", "b.txt"), stored("f1", "a.txt")],
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/blobs/files/u1/f1-a.txt"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/files/f1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let cli = Cli::new(&server);
    let manager = cli.signed_in_manager().await;
    manager.mount().await;

    let names: Vec<String> = manager.files().into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);

    let outcome = manager.delete("f1", &|_: &ManagedFile| true).await;
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(manager.files().len(), 1);

    let outcome = manager.delete("f1", &|_: &ManagedFile| true).await;
    assert_eq!(outcome, DeleteOutcome::NotFound);
}

#[tokio::test]
async fn test_rm_declined_makes_no_requests() {
    let server = MockServer::start().await;
    mock_sign_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/files"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "files": [stored("f1", "a.txt")] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let cli = Cli::new(&server);
    let manager = cli.signed_in_manager().await;
    manager.mount().await;

    let outcome = manager.delete("f1", &|_: &ManagedFile| false).await;

    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(manager.files().len(), 1);
}
