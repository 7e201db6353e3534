//! Runs the real server on an ephemeral port and drives it through the
//! HTTP client and the list synchroniser.

use std::sync::Arc;

use useradmin::{
    app::build_app,
    client::{
        api::GENERIC_ERROR, ApiClient, AutoConfirm, ClientError, UserApi, UserForm, UserFormData,
        UserListSync,
    },
    config::ClientConfig,
    state::AppState,
    users::{User, UserDraft, UserPatch},
};

async fn spawn_server(seed: Vec<User>) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(AppState::with_users(seed));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    ApiClient::new(&ClientConfig {
        base_url: format!("http://{addr}/api"),
    })
    .unwrap()
}

fn alice() -> User {
    User {
        id: "0001".into(),
        name: "Alice".into(),
        email: "alice@x.com".into(),
        status: "Active".into(),
    }
}

#[tokio::test]
async fn client_covers_every_endpoint() {
    let client = spawn_server(vec![alice()]).await;

    assert_eq!(client.fetch_users().await.unwrap(), vec![alice()]);
    assert_eq!(client.fetch_user("0001").await.unwrap(), alice());

    let created = client
        .create_user(&UserDraft::new("Bob", "bob@x.com", "Active"))
        .await
        .unwrap();
    assert_eq!(created.id, "0002");

    let replaced = client
        .update_user("0002", &UserDraft::new("Robert", "rob@x.com", "Inactive"))
        .await
        .unwrap();
    assert_eq!(replaced.name, "Robert");

    let patched = client
        .patch_user("0001", &UserPatch::status("Inactive"))
        .await
        .unwrap();
    assert_eq!(patched.status, "Inactive");
    assert_eq!(patched.name, "Alice");

    client.delete_user("0001").await.unwrap();
    let remaining = client.fetch_users().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "0002");
}

#[tokio::test]
async fn server_rejections_keep_their_message() {
    let client = spawn_server(Vec::new()).await;

    let err = client.fetch_user("0404").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 404, .. }));
    assert_eq!(err.to_string(), "User not found");

    let err = client
        .create_user(&UserDraft {
            name: Some("A".into()),
            ..UserDraft::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 400, .. }));
    assert_eq!(err.to_string(), "Missing required fields: email, status");

    let err = client.delete_user("0001").await.unwrap_err();
    assert_eq!(err.to_string(), "User not found");
}

#[tokio::test]
async fn form_to_sync_to_server() {
    let client = spawn_server(vec![alice()]).await;
    let sync = UserListSync::mount(Arc::new(client.clone()), Arc::new(AutoConfirm(true))).await;
    assert_eq!(sync.users(), vec![alice()]);

    let mut form = UserForm::default();
    form.set_form_data(&UserFormData {
        name: "  Ann Lee ".into(),
        email: "ann@x.com".into(),
        status: "Active".into(),
    });
    assert!(form.is_valid());

    let created = sync.create_user_item(form.payload()).await.unwrap();
    assert_eq!(created.id, "0002");
    assert_eq!(created.name, "Ann Lee");
    assert_eq!(sync.users().len(), 2);

    assert!(sync.delete_user_item(&alice()).await);
    assert_eq!(sync.users(), vec![created.clone()]);

    // The local snapshot matches what the server now holds.
    assert_eq!(client.fetch_users().await.unwrap(), sync.users());

    // A deleted ID is never handed out again.
    let next = sync
        .create_user_item(UserDraft::new("Cy", "cy@x.com", "Inactive"))
        .await
        .unwrap();
    assert_eq!(next.id, "0003");
}

#[tokio::test]
async fn sync_against_dead_server_reports_generic_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ApiClient::new(&ClientConfig {
        base_url: format!("http://127.0.0.1:{port}/api"),
    })
    .unwrap();

    let sync = UserListSync::mount(Arc::new(client), Arc::new(AutoConfirm(true))).await;

    assert!(!sync.loading());
    assert_eq!(sync.error().as_deref(), Some(GENERIC_ERROR));
    assert!(sync.users().is_empty());
}
