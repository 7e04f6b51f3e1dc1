//! Liveness steps
//!
//! Open a proof-of-life session on the mostQI API, hand its link to the
//! operator and later report its result as an approval form.

use log::{error, info};
use serde_json::{Value, json};

use crate::config::Config;
use crate::constants::{
    LIVENESS_INSTRUCTIONS_INTRO, LIVENESS_INSTRUCTIONS_OUTRO, LIVENESS_INSTRUCTIONS_TITLE,
};
use crate::errors::Error;
use crate::mostqi::MostQiClient;
use crate::mostqi::model::LivenessStatusResponse;
use crate::shortener::LinkShortener;
use crate::utils::display_value;

use super::response::ApprovalForm;

const START_TITLE: &str = "Link para Prova de Vida";
const START_DESCRIPTION: &str =
    "O link foi gerado com sucesso para realizar a verificação de vivacidade.";
const START_INCOMPLETE: &str =
    "Não foi possível gerar o link de prova de vida. Verifique os dados e tente novamente.";

/// Creates a liveness session and hands its link to the host
pub async fn liveness_start(client: &MostQiClient, config: &Config, client_key: &str) -> ApprovalForm {
    match open_session(client, config, client_key).await {
        Ok(Some((process_id, session_url))) => {
            info!("Liveness session {process_id} created");
            ApprovalForm::form(START_TITLE, START_DESCRIPTION)
                .with_default_arg("process_id", json!(process_id))
                .with_default_arg("session_url", json!(session_url))
        }
        Ok(None) => ApprovalForm::message("Erro", START_INCOMPLETE),
        Err(e) => {
            error!("Could not create liveness session: {e}");
            ApprovalForm::message("Erro", &format!("Falha ao gerar link de prova de vida: {e}"))
        }
    }
}

async fn open_session(
    client: &MostQiClient,
    config: &Config,
    client_key: &str,
) -> crate::errors::Result<Option<(String, String)>> {
    let jwt = client.authenticate(client_key).await?;
    let response = client.start_liveness(&jwt, &config.liveness).await?;

    let session = response.result.unwrap_or_default();
    let process_id = session.process_id.filter(|id| !id.is_empty());
    let session_url = session.session_url.filter(|url| !url.is_empty());
    Ok(process_id.zip(session_url))
}

/// Tells the operator how to complete the liveness session at `session_url`
pub async fn liveness_instructions(shortener: &LinkShortener, session_url: &str) -> ApprovalForm {
    match shortener.shorten(session_url).await {
        Ok(link) => ApprovalForm::message(
            LIVENESS_INSTRUCTIONS_TITLE,
            &liveness_instructions_text(&link),
        ),
        Err(e) => {
            error!("Could not shorten session link: {e}");
            ApprovalForm::message(
                "Erro ao encurtar link",
                &format!("Falha ao gerar link curto: {e}"),
            )
        }
    }
}

fn liveness_instructions_text(link: &str) -> String {
    format!("{LIVENESS_INSTRUCTIONS_INTRO}{link}{LIVENESS_INSTRUCTIONS_OUTRO}")
}

/// Reports the state of a liveness session
pub async fn liveness_status(client: &MostQiClient, client_key: &str, process_id: &str) -> ApprovalForm {
    if client_key.trim().is_empty() || process_id.trim().is_empty() {
        return failure_form("Erro", "Chave do cliente ou process ID não informado.");
    }

    // A refused key is an HTTP failure, a reply without token an authentication one
    let jwt = match client.request_token(client_key).await {
        Ok(Some(jwt)) => jwt,
        Ok(None) => {
            error!("Liveness status authentication returned no token");
            return failure_form("Erro de autenticação", "Não foi possível obter token JWT.");
        }
        Err(e) => return status_failure(&e),
    };

    match client.liveness_status(&jwt, process_id).await {
        Ok(response) => status_form(&response),
        Err(e) => status_failure(&e),
    }
}

fn status_form(response: &LivenessStatusResponse) -> ApprovalForm {
    let status = response.session_status();
    let score = response.liveness_score();
    let image = response.frontal_image();
    let api_status = response.status.clone().unwrap_or_default();

    let code = api_status
        .code
        .as_ref()
        .map(display_value)
        .unwrap_or_else(|| "N/A".to_string());
    let message = api_status
        .message
        .unwrap_or_else(|| "Sem mensagem".to_string());
    let request_id = response
        .request_id
        .as_ref()
        .map(display_value)
        .unwrap_or_else(|| "None".to_string());

    let mut description = format!(
        "Status atual: **{status}**\n\n\
         Score de vivacidade: `{score:?}`\n\n\
         requestId: `{request_id}`\n\
         Código da resposta: `{code}` - {message}"
    );
    if image.is_some() {
        description.push_str("\n\nImagem capturada disponível nos argumentos padrão.");
    } else {
        description.push_str("\n\n**Nenhuma imagem capturada disponível.**");
    }

    ApprovalForm::form(&format!("Status: {status}"), &description)
        .with_default_arg("imagem_base64", json!(image))
        .with_output("liveness_score", json!(score))
}

fn status_failure(error: &Error) -> ApprovalForm {
    error!("Liveness status query failed: {error}");
    match error {
        Error::Api { status, body } => failure_form(
            "Erro HTTP",
            &format!(
                "Erro na requisição HTTP.\nCódigo: {status}\nDetalhes: {body}\nExceção: {error}"
            ),
        ),
        other => failure_form(
            "Erro inesperado",
            &format!("Falha ao consultar status de prova de vida: {other}"),
        ),
    }
}

fn failure_form(title: &str, description: &str) -> ApprovalForm {
    ApprovalForm::message(title, description).with_default_arg("imagem_base64", Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{api_error, generic_error};

    fn status_response(value: Value) -> LivenessStatusResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_status_form_with_image() {
        let response = status_response(json!({
            "requestId": "req-1",
            "status": {"code": 0, "message": "OK"},
            "result": {"status": "Finished", "livenessScore": 0.97, "frontalImage": "QUJD"}
        }));
        let form = status_form(&response);

        assert_eq!(form.title, "Status: Finished");
        assert!(form.description.contains("Score de vivacidade: `0.97`"));
        assert!(form.description.contains("requestId: `req-1`"));
        assert!(form.description.contains("Código da resposta: `0` - OK"));
        assert!(form.description.ends_with("Imagem capturada disponível nos argumentos padrão."));
        assert_eq!(form.default_args.unwrap()["imagem_base64"], "QUJD");
        assert_eq!(form.outputs.unwrap()["liveness_score"], 0.97);
    }

    #[test]
    fn test_status_form_without_result() {
        let form = status_form(&status_response(json!({})));

        assert_eq!(form.title, "Status: Indefinido");
        assert!(form.description.contains("Score de vivacidade: `0.0`"));
        assert!(form.description.contains("requestId: `None`"));
        assert!(form.description.contains("`N/A` - Sem mensagem"));
        assert!(form.description.ends_with("**Nenhuma imagem capturada disponível.**"));
        assert_eq!(form.default_args.unwrap()["imagem_base64"], Value::Null);
    }

    #[test]
    fn test_liveness_instructions_text() {
        let text = liveness_instructions_text("https://s/abc");
        assert!(text.starts_with("VERIFICAÇÃO DE VIVACIDADE OBRIGATÓRIA\n\n"));
        assert!(text.contains("no navegador para iniciar a verificação:\nhttps://s/abc\n\n2. Siga"));
        assert!(text.ends_with("para prosseguir com o fluxo."));
        assert_eq!(text.lines().count(), 9);
    }

    #[test]
    fn test_status_failure_titles() {
        let form = status_failure(&api_error(404, "process not found"));
        assert_eq!(form.title, "Erro HTTP");
        assert!(form.description.contains("Código: 404"));
        assert!(form.description.contains("Detalhes: process not found"));

        let form = status_failure(&generic_error("boom"));
        assert_eq!(form.title, "Erro inesperado");
        assert_eq!(
            form.description,
            "Falha ao consultar status de prova de vida: boom"
        );
    }
}
