//! Document extraction steps
//!
//! Forward the images collected by the host to the mostQI API and reshape the
//! reply into an [`ExtractionOutcome`]. Failures never escape these steps;
//! they become `erro` outcomes the host stores like any other result.

use log::{error, info, warn};
use serde_json::json;

use crate::config::Config;
use crate::errors::Error;
use crate::file_input::FileInput;
use crate::mostqi::{CnhData, MostQiClient, VioData};

use super::response::ExtractionOutcome;

/// Extracts the printed data from the front of the CNH
pub async fn extract_front(
    client: &MostQiClient,
    config: &Config,
    client_key: &str,
    image: FileInput,
) -> ExtractionOutcome {
    info!("Starting authentication and CNH content extraction...");

    if client_key.trim().is_empty() {
        return ExtractionOutcome::error("Chave do cliente não fornecida");
    }
    if image.is_empty() {
        return ExtractionOutcome::error("Arquivo de imagem não fornecido");
    }

    let jwt = match client.authenticate(client_key).await {
        Ok(jwt) => jwt,
        Err(e) => {
            return ExtractionOutcome::error(&format!(
                "Falha ao obter token JWT: {}",
                authentication_message(&e)
            ));
        }
    };

    let content = match image.into_bytes() {
        Ok(content) => content,
        Err(e) => {
            return ExtractionOutcome::error(&format!("Erro ao ler arquivo de imagem: {e}"));
        }
    };
    info!("Image read, {} bytes", content.len());

    let response = match client.extract_content(&jwt, content).await {
        Ok(response) => response,
        Err(e) => return front_failure(&e),
    };

    let deskewed_image = response.first().and_then(|result| result.image.clone());
    if deskewed_image.is_none() {
        warn!("The API returned no deskewed image");
    }

    let cnh_data = CnhData::from_response(&response);
    if !cnh_data.is_identified() {
        return ExtractionOutcome {
            score: cnh_data.score,
            ..ExtractionOutcome::warning("Nenhum dado foi extraído da imagem")
        };
    }

    let threshold = config.thresholds.extraction_score;
    let fields_extracted = cnh_data.fields_extracted();
    info!("Extraction finished, {fields_extracted} fields extracted");

    ExtractionOutcome {
        imagem_corrigida: deskewed_image,
        ..ExtractionOutcome::success("Dados extraídos com sucesso", cnh_data.to_output(threshold))
    }
    .with_metadata(json!({
        "score": cnh_data.score,
        "campos_extraidos": fields_extracted,
        "metodo_extracao": "mostQI_Content_API",
        "qualidade": cnh_data.quality_status(threshold),
    }))
}

/// Extracts the data encoded in the QR code on the back of the CNH
pub async fn extract_qrcode(
    client: &MostQiClient,
    client_key: &str,
    image: FileInput,
) -> ExtractionOutcome {
    if client_key.trim().is_empty() {
        return ExtractionOutcome::error("Chave do cliente ausente");
    }
    if image.is_empty() {
        return ExtractionOutcome::error("Arquivo da imagem não foi enviado");
    }

    let jwt = match client.authenticate(client_key).await {
        Ok(jwt) => jwt,
        Err(e) => {
            error!("Could not obtain JWT: {e}");
            return ExtractionOutcome::error("Falha ao obter token JWT");
        }
    };

    let content = match image.into_bytes() {
        Ok(content) => content,
        Err(e) => {
            return ExtractionOutcome::error(&format!("Erro ao ler arquivo de imagem: {e}"));
        }
    };

    let response = match client.extract_vio(&jwt, content).await {
        Ok(response) => response,
        Err(e) => return qrcode_failure(&e),
    };

    let vio_data = VioData::from_response(&response);
    if !vio_data.is_identified() {
        return ExtractionOutcome::warning("Nenhum dado relevante extraído da imagem")
            .with_metadata(vio_data.metadata());
    }

    ExtractionOutcome::success("QR code extraído com sucesso", vio_data.to_output())
        .with_metadata(vio_data.metadata())
}

fn authentication_message(error: &Error) -> String {
    match error {
        Error::Authentication { detail } => detail.clone(),
        other => format!("Erro inesperado ao obter o token: {other}"),
    }
}

fn front_failure(error: &Error) -> ExtractionOutcome {
    error!("Content extraction failed: {error}");
    let message = match error {
        Error::Api { status: 401, .. } => "Token JWT inválido ou expirado".to_string(),
        Error::Api { status: 400, body } => format!("Erro na imagem ou formato: {body}"),
        Error::Api { status, body } => format!("Erro da API: {status} - {body}"),
        e if e.is_timeout() => "Timeout na requisição para a API".to_string(),
        Error::Http { .. } => format!("Erro na comunicação com a API: {error}"),
        other => format!("Erro inesperado: {other}"),
    };
    ExtractionOutcome::error(&message)
}

fn qrcode_failure(error: &Error) -> ExtractionOutcome {
    error!("VIO extraction failed: {error}");
    let message = match error {
        Error::Api { status: 401, .. } => "Token JWT inválido ou expirado".to_string(),
        Error::Api { status: 400, body } => format!("Erro na imagem: {body}"),
        Error::Api { status, body } => format!("Erro HTTP {status}: {body}"),
        e if e.is_timeout() => "Timeout na requisição".to_string(),
        other => format!("Erro inesperado: {other}"),
    };
    ExtractionOutcome::error(&message)
}
