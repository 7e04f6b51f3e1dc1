//! mostQI HTTP client
//!
//! One method per endpoint used by the flow. Every call takes the JWT
//! returned by [`MostQiClient::authenticate`].

use std::time::Duration;

use log::{debug, error, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::{LivenessConfig, MostQiConfig};
use crate::constants::{
    AUTH_PATH, CNH_EXTRACTION_TAGS, CONTENT_EXTRACTION_PATH, FACE_COMPARE_PATH,
    LIVENESS_START_PATH, LIVENESS_STATUS_PATH, USER_AGENT, VIO_EXTRACTION_PATH,
};
use crate::errors::{Error, Result, api_error, authentication_error, http_error};

use super::model::{
    AuthResponse, ExtractionResponse, FaceCompareResponse, LivenessStartResponse,
    LivenessStatusResponse,
};

/// Client for the mostQI document-intelligence API
#[derive(Debug, Clone)]
pub struct MostQiClient {
    http: Client,
    base_url: String,
    request_timeout: Duration,
    auth_timeout: Duration,
}

impl MostQiClient {
    /// Creates a client from the `mostqi` configuration section
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(config: &MostQiConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| http_error(e, "build HTTP client"))?;

        Ok(MostQiClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout(),
            auth_timeout: config.auth_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchanges the client key for a JWT
    ///
    /// # Errors
    /// Returns an authentication error when the API refuses the key or the
    /// response carries no token, and an HTTP error on transport failure
    pub async fn authenticate(&self, client_key: &str) -> Result<String> {
        match self.request_token(client_key).await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(authentication_error(
                "O token não foi encontrado na resposta da API.",
            )),
            Err(Error::Api { status, body }) => Err(authentication_error(&format!(
                "A API retornou status {status}: {body}"
            ))),
            Err(e @ Error::Http { .. }) if !e.is_decode() => Err(e),
            Err(_) => Err(authentication_error("Formato inválido na resposta da API.")),
        }
    }

    /// Posts the client key and returns the token, if the reply carries one
    ///
    /// # Errors
    /// Returns an API error for any status other than 200 and an HTTP error
    /// when the request fails or the reply is not JSON
    pub async fn request_token(&self, client_key: &str) -> Result<Option<String>> {
        info!("Authenticating with the mostQI API...");
        let request = self
            .http
            .post(self.url(AUTH_PATH))
            .json(&json!({ "token": client_key }));
        let auth: AuthResponse = self
            .send_json_within(request, self.auth_timeout, "authenticate")
            .await?;

        let token = auth.token.filter(|token| !token.is_empty());
        if token.is_some() {
            info!("JWT received");
        }
        Ok(token)
    }

    /// Extracts the printed fields from an image of the front of a CNH
    ///
    /// # Errors
    /// Returns an API error for any status other than 200
    pub async fn extract_content(&self, jwt: &str, image: Vec<u8>) -> Result<ExtractionResponse> {
        let file = Part::bytes(image)
            .file_name("cnh_image.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| http_error(e, "build multipart body"))?;
        let form = CNH_EXTRACTION_TAGS.iter().fold(
            Form::new()
                .part("file", file)
                .text("returnImage", "true")
                .text("returnCrops", "true"),
            |form, tag| form.text("tags", *tag),
        );

        debug!("Sending front image for content extraction");
        let request = self
            .http
            .post(self.url(CONTENT_EXTRACTION_PATH))
            .header("accept", "application/json")
            .bearer_auth(jwt)
            .multipart(form);
        self.send_json(request, "extract content").await
    }

    /// Decodes the QR code on the back of a CNH
    ///
    /// # Errors
    /// Returns an API error for any status other than 200
    pub async fn extract_vio(&self, jwt: &str, image: Vec<u8>) -> Result<ExtractionResponse> {
        let file = Part::bytes(image)
            .file_name("qr_image.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| http_error(e, "build multipart body"))?;

        debug!("Sending QR code image for VIO extraction");
        let request = self
            .http
            .post(self.url(VIO_EXTRACTION_PATH))
            .bearer_auth(jwt)
            .multipart(Form::new().part("file", file));
        self.send_json(request, "extract QR code").await
    }

    /// Opens an asynchronous liveness session
    ///
    /// # Errors
    /// Returns an API error for any status other than 200
    pub async fn start_liveness(
        &self,
        jwt: &str,
        liveness: &LivenessConfig,
    ) -> Result<LivenessStartResponse> {
        let request = self
            .http
            .post(self.url(LIVENESS_START_PATH))
            .bearer_auth(jwt)
            .json(&liveness_payload(liveness));
        self.send_json(request, "start liveness session").await
    }

    /// Queries the state of a liveness session
    ///
    /// # Errors
    /// Returns an API error for any status other than 200
    pub async fn liveness_status(
        &self,
        jwt: &str,
        process_id: &str,
    ) -> Result<LivenessStatusResponse> {
        let request = self
            .http
            .post(self.url(LIVENESS_STATUS_PATH))
            .bearer_auth(jwt)
            .json(&json!({ "processId": process_id }));
        self.send_json(request, "query liveness status").await
    }

    /// Compares two face images
    ///
    /// # Errors
    /// Returns an API error for any status other than 200
    pub async fn compare_faces(
        &self,
        jwt: &str,
        face_a: Vec<u8>,
        face_b: Vec<u8>,
    ) -> Result<FaceCompareResponse> {
        let part_a = Part::bytes(face_a)
            .file_name("face_a.jpg")
            .mime_str("application/octet-stream")
            .map_err(|e| http_error(e, "build multipart body"))?;
        let part_b = Part::bytes(face_b)
            .file_name("face_b.jpg")
            .mime_str("application/octet-stream")
            .map_err(|e| http_error(e, "build multipart body"))?;

        let request = self
            .http
            .post(self.url(FACE_COMPARE_PATH))
            .bearer_auth(jwt)
            .multipart(Form::new().part("faceFileA", part_a).part("faceFileB", part_b));
        self.send_json(request, "compare faces").await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T> {
        self.send_json_within(request, self.request_timeout, operation)
            .await
    }

    async fn send_json_within<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        timeout: Duration,
        operation: &str,
    ) -> Result<T> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| http_error(e, operation))?;

        let status = response.status();
        debug!("{operation}: HTTP {}", status.as_u16());
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!("HTTP {} while trying to {}: {}", status.as_u16(), operation, body);
            return Err(api_error(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| http_error(e, &format!("decode response to {operation}")))
    }
}

/// Body of the liveness session request
pub fn liveness_payload(liveness: &LivenessConfig) -> Value {
    let mut payload = json!({
        "uiCustomization": {
            "defaultLanguage": liveness.default_language,
            "theme": liveness.theme,
            "primaryColor": liveness.primary_color,
            "hideTopbar": liveness.hide_topbar,
            "welcomeMessage": {
                "pt-BR": "Vamos iniciar sua verificação de vivacidade.",
                "en": "Let's begin your liveness verification.",
                "es": "Vamos a comenzar tu verificación de vivacidad.",
                "fr": "Commençons votre vérification de vivacité.",
            },
            "successMessage": {
                "pt-BR": "Vivacidade confirmada com sucesso!",
                "en": "Liveness successfully confirmed!",
                "es": "¡Vivacidad confirmada con éxito!",
                "fr": "Vivacité confirmée avec succès !",
            },
            "failureMessage": {
                "pt-BR": "Não foi possível confirmar sua vivacidade. Tente novamente.",
                "en": "We couldn't confirm your liveness. Please try again.",
                "es": "No fue posible confirmar tu vivacidad. Intenta de nuevo.",
                "fr": "Impossible de confirmer votre vivacité. Veuillez réessayer.",
            },
        },
        "redirectUrl": liveness.redirect_url,
    });

    if let Some(webhook) = &liveness.webhook_url {
        payload["webhook"] = json!({ "url": webhook });
    }
    payload
}
