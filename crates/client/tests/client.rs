use consultoria_client::{Ack, DEFAULT_ENDPOINT, SubmissionClient, SubmissionError};
use consultoria_contact::ContactSubmission;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method},
};

fn juan_perez() -> ContactSubmission {
    ContactSubmission {
        nombre: "Juan Perez".to_owned(),
        email: "juan@x.com".to_owned(),
        telefono: "+56912345678".to_owned(),
        servicio: "web".to_owned(),
        comentario: "Quiero cotizar un sitio web nuevo".to_owned(),
    }
}

#[test]
fn test_default_endpoint_is_fixed() {
    assert_eq!(SubmissionClient::default().endpoint(), DEFAULT_ENDPOINT);
}

#[tokio::test]
async fn test_submit_posts_json_and_returns_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "nombre": "Juan Perez",
            "email": "juan@x.com",
            "telefono": "+56912345678",
            "servicio": "web",
            "comentario": "Quiero cotizar un sitio web nuevo",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "Formulario recibido con éxito!" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = SubmissionClient::with_endpoint(server.uri());
    let ack = client.submit(&juan_perez()).await.unwrap();

    assert_eq!(
        ack,
        Ack {
            message: "Formulario recibido con éxito!".to_owned()
        }
    );
}

#[tokio::test]
async fn test_server_error_is_generic_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "Algo salió mal." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = SubmissionClient::with_endpoint(server.uri());
    let err = client.submit(&juan_perez()).await.unwrap_err();

    assert_eq!(err, SubmissionError::Rejected);
    assert_eq!(err.to_string(), "El servidor no pudo procesar la solicitud.");
}

#[tokio::test]
async fn test_client_errors_are_rejections_too() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = SubmissionClient::with_endpoint(server.uri());

    assert_eq!(
        client.submit(&juan_perez()).await,
        Err(SubmissionError::Rejected)
    );
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    let client = SubmissionClient::with_endpoint("http://127.0.0.1:1");
    let err = client.submit(&juan_perez()).await.unwrap_err();

    assert_eq!(err, SubmissionError::Connection);
    assert_eq!(err.to_string(), "No se pudo conectar con el servidor.");
}

#[tokio::test]
async fn test_unreadable_success_body_is_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let client = SubmissionClient::with_endpoint(server.uri());

    assert_eq!(
        client.submit(&juan_perez()).await,
        Err(SubmissionError::Connection)
    );
}
