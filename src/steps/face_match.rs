//! Face match step
//!
//! Compares the portrait on the CNH with the frontal image captured during
//! the liveness session.

use log::{error, info};
use serde_json::json;

use crate::config::Config;
use crate::errors::Error;
use crate::file_input::{FileInput, decode_base64};
use crate::mostqi::MostQiClient;
use crate::mostqi::model::FaceCompareResponse;
use crate::utils::{display_value, round2, strip_data_uri};

use super::response::ApprovalForm;

const RESULT_TITLE: &str = "Resultado da Comparação Facial";
const ERROR_TITLE: &str = "Erro na Comparação Facial";

/// Compares face A (any host file representation) with face B (base64)
pub async fn face_match(
    client: &MostQiClient,
    config: &Config,
    client_key: &str,
    face_a: FileInput,
    face_b: &str,
) -> ApprovalForm {
    match compare(client, config, client_key, face_a, face_b).await {
        Ok(form) => form,
        Err(message) => {
            error!("Face match failed: {message}");
            ApprovalForm::form(ERROR_TITLE, &message)
        }
    }
}

async fn compare(
    client: &MostQiClient,
    config: &Config,
    client_key: &str,
    face_a: FileInput,
    face_b: &str,
) -> std::result::Result<ApprovalForm, String> {
    if client_key.trim().is_empty() || face_a.is_empty() || face_b.trim().is_empty() {
        return Err("Todos os campos são obrigatórios. Verifique as entradas.".to_string());
    }

    let jwt = client.authenticate(client_key).await.map_err(|e| match e {
        Error::Authentication { .. } => {
            "Erro na autenticação: token inválido ou serviço indisponível.".to_string()
        }
        other => format!("Falha ao autenticar: {other}"),
    })?;

    let bytes_a = face_a
        .into_bytes()
        .map_err(|e| format!("Erro ao ler arquivo de imagem: {e}"))?;
    let bytes_b = decode_base64(strip_data_uri(face_b)).map_err(|_| {
        "Erro ao decodificar imagem base64 da selfie: verifique o conteúdo enviado.".to_string()
    })?;

    let response = client
        .compare_faces(&jwt, bytes_a, bytes_b)
        .await
        .map_err(|e| match e {
            Error::Api { status, body } => format!(
                "Erro ao comparar imagens: verifique os arquivos enviados.\n\
                 Código HTTP: {status}\n\
                 Detalhes: {body}"
            ),
            other => format!("Erro inesperado na requisição FaceMatch: {other}"),
        })?;

    Ok(result_form(&response, config.thresholds.face_match))
}

fn result_form(response: &FaceCompareResponse, threshold: f64) -> ApprovalForm {
    let similarity = response.similarity();
    let percentage = round2(similarity * 100.0);
    let approved = similarity >= threshold;
    info!("Face similarity {percentage}%, approved: {approved}");

    let api_status = response.status.clone().unwrap_or_default();
    let code = api_status
        .code
        .as_ref()
        .map(display_value)
        .unwrap_or_else(|| "N/A".to_string());
    let message = api_status
        .message
        .unwrap_or_else(|| "Desconhecido".to_string());
    let request_id = response
        .request_id
        .as_ref()
        .map(display_value)
        .unwrap_or_else(|| "None".to_string());

    let description = format!(
        "Similaridade facial: {percentage:?}%\n\n\
         Aprovação: {}\n\n\
         Status da API: {code} - {message}\n\
         Request ID: {request_id}",
        if approved { "Sim" } else { "Não" }
    );

    ApprovalForm::form(RESULT_TITLE, &description)
        .with_field("similaridade_percentual", json!(percentage))
        .with_field("aprovado", json!(approved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn compare_response(value: Value) -> FaceCompareResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_result_form_rounds_percentage() {
        let response = compare_response(json!({
            "requestId": "abc",
            "status": {"code": 0, "message": "Success"},
            "result": {"similarity": 0.87654}
        }));
        let form = result_form(&response, 0.70);
        let fields = form.fields.unwrap();

        assert_eq!(form.title, RESULT_TITLE);
        assert_eq!(fields["similaridade_percentual"], 87.65);
        assert_eq!(fields["aprovado"], true);
        assert!(form.description.starts_with("Similaridade facial: 87.65%"));
        assert!(form.description.contains("Aprovação: Sim"));
        assert!(form.description.contains("Status da API: 0 - Success"));
        assert!(form.description.ends_with("Request ID: abc"));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let response = compare_response(json!({"result": {"similarity": 0.70}}));
        let form = result_form(&response, 0.70);
        assert_eq!(form.fields.unwrap()["aprovado"], true);

        let response = compare_response(json!({"result": {"similarity": 0.6999}}));
        let form = result_form(&response, 0.70);
        assert!(form.description.contains("Aprovação: Não"));
    }

    #[test]
    fn test_missing_similarity_is_zero() {
        let form = result_form(&compare_response(json!({})), 0.70);
        assert!(form.description.contains("Similaridade facial: 0.0%"));
        assert!(form.description.contains("Status da API: N/A - Desconhecido"));
        assert_eq!(form.fields.unwrap()["aprovado"], false);
    }
}
