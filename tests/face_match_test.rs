use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cnh_validator::config::Config;
use cnh_validator::file_input::FileInput;
use cnh_validator::mostqi::MostQiClient;
use cnh_validator::steps::face_match;

// "selfie" in base64
const FACE_B: &str = "c2VsZmll";

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.mostqi.base_url = server.uri();
    config
}

async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/user/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-123"})))
        .mount(server)
        .await;
}

async fn mount_compare(server: &MockServer, similarity: f64) {
    Mock::given(method("POST"))
        .and(path("/process-image/biometrics/face-compare"))
        .and(header("authorization", "Bearer jwt-123"))
        .and(body_string_contains("faceFileA"))
        .and(body_string_contains("faceFileB"))
        .and(body_string_contains("selfie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requestId": "req-5",
            "status": {"code": 0, "message": "Success"},
            "result": {"similarity": similarity}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_face_match_approved() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_compare(&server, 0.8123).await;

    let config = config_for(&server);
    let client = MostQiClient::new(&config.mostqi).unwrap();
    let form = face_match(
        &client,
        &config,
        "client-key",
        FileInput::from(b"portrait".as_slice()),
        FACE_B,
    )
    .await;
    let value = serde_json::to_value(&form).unwrap();

    assert_eq!(value["title"], "Resultado da Comparação Facial");
    assert_eq!(value["fields"]["similaridade_percentual"], 81.23);
    assert_eq!(value["fields"]["aprovado"], true);
    assert!(form.description.contains("Request ID: req-5"));
}

#[tokio::test]
async fn test_face_match_rejected_below_configured_threshold() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_compare(&server, 0.8123).await;

    let mut config = config_for(&server);
    config.thresholds.face_match = 0.9;
    let client = MostQiClient::new(&config.mostqi).unwrap();
    let form = face_match(
        &client,
        &config,
        "client-key",
        FileInput::from(b"portrait".as_slice()),
        FACE_B,
    )
    .await;

    assert_eq!(form.fields.unwrap()["aprovado"], false);
    assert!(form.description.contains("Aprovação: Não"));
}

#[tokio::test]
async fn test_face_match_requires_every_input() {
    let config = Config::default();
    let client = MostQiClient::new(&config.mostqi).unwrap();
    let form = face_match(
        &client,
        &config,
        "client-key",
        FileInput::from(Vec::new()),
        FACE_B,
    )
    .await;

    assert_eq!(form.title, "Erro na Comparação Facial");
    assert_eq!(
        form.description,
        "Todos os campos são obrigatórios. Verifique as entradas."
    );
    assert_eq!(form.fields.unwrap().len(), 0);
}

#[tokio::test]
async fn test_face_match_invalid_base64() {
    let server = MockServer::start().await;
    mount_auth(&server).await;

    let config = config_for(&server);
    let client = MostQiClient::new(&config.mostqi).unwrap();
    let form = face_match(
        &client,
        &config,
        "client-key",
        FileInput::from(b"portrait".as_slice()),
        "%%% not base64 %%%",
    )
    .await;

    assert_eq!(form.title, "Erro na Comparação Facial");
    assert_eq!(
        form.description,
        "Erro ao decodificar imagem base64 da selfie: verifique o conteúdo enviado."
    );
}

#[tokio::test]
async fn test_face_match_http_error() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/process-image/biometrics/face-compare"))
        .respond_with(ResponseTemplate::new(422).set_body_string("no face found"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = MostQiClient::new(&config.mostqi).unwrap();
    let form = face_match(
        &client,
        &config,
        "client-key",
        FileInput::from(b"portrait".as_slice()),
        FACE_B,
    )
    .await;

    assert_eq!(form.title, "Erro na Comparação Facial");
    assert!(form.description.contains("Código HTTP: 422"));
    assert!(form.description.contains("Detalhes: no face found"));
}

#[tokio::test]
async fn test_face_match_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/authenticate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let client = MostQiClient::new(&config.mostqi).unwrap();
    let form = face_match(
        &client,
        &config,
        "client-key",
        FileInput::from(b"portrait".as_slice()),
        FACE_B,
    )
    .await;

    assert_eq!(
        form.description,
        "Erro na autenticação: token inválido ou serviço indisponível."
    );
}
