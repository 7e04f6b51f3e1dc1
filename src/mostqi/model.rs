//! mostQI response models
//!
//! Wire shapes of the API responses and the document records built from them.

use serde::Deserialize;
use serde_json::{Value, json};

/// Body of `/user/authenticate`
#[derive(Deserialize, Debug, Default)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of the image processing endpoints
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ExtractionResponse {
    #[serde(default)]
    pub result: Vec<ExtractionResult>,
}

impl ExtractionResponse {
    /// The first (and in practice only) processed page
    pub fn first(&self) -> Option<&ExtractionResult> {
        self.result.first()
    }
}

/// One processed page
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(default)]
    pub fields: Vec<ExtractedField>,
    #[serde(default)]
    pub score: Option<f64>,
    /// Deskewed image, base64
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub page_number: Option<i64>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl ExtractionResult {
    /// Text of the last populated entry with this name
    ///
    /// Empty and null values are skipped before a repeated name is resolved.
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .rev()
            .filter(|field| field.name == name)
            .find_map(ExtractedField::text)
    }

    /// Text of the last entry with this name, even when that entry is empty
    pub fn last_field(&self, name: &str) -> Option<String> {
        self.fields
            .iter()
            .rev()
            .find(|field| field.name == name)
            .and_then(ExtractedField::text)
    }
}

/// A named value extracted from the document
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ExtractedField {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

impl ExtractedField {
    fn text(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Data read from the front of a CNH
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CnhData {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub data_nascimento: Option<String>,
    pub local_nascimento: Option<String>,
    pub categoria: Option<String>,
    pub data_emissao: Option<String>,
    pub data_validade: Option<String>,
    pub registro: Option<String>,
    pub filiacao_1: Option<String>,
    pub filiacao_2: Option<String>,
    pub score: Option<f64>,
}

impl CnhData {
    pub fn from_response(response: &ExtractionResponse) -> Self {
        let Some(result) = response.first() else {
            return CnhData::default();
        };

        CnhData {
            nome: result.field("nome"),
            cpf: result.field("cpf"),
            rg: result.field("rg"),
            data_nascimento: result.field("data_nascimento"),
            local_nascimento: result.field("local_nascimento"),
            categoria: result.field("cat_hab"),
            data_emissao: result.field("data_emissao"),
            data_validade: result.field("data_validade"),
            registro: result.field("registro"),
            filiacao_1: result.field("filiacao_1"),
            filiacao_2: result.field("filiacao_2"),
            score: result.score,
        }
    }

    /// Whether the holder could be identified at all
    pub fn is_identified(&self) -> bool {
        self.nome.is_some() || self.cpf.is_some()
    }

    /// Number of populated fields, the score included
    pub fn fields_extracted(&self) -> usize {
        [
            &self.nome,
            &self.cpf,
            &self.rg,
            &self.data_nascimento,
            &self.local_nascimento,
            &self.categoria,
            &self.data_emissao,
            &self.data_validade,
            &self.registro,
            &self.filiacao_1,
            &self.filiacao_2,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
            + usize::from(self.score.is_some())
    }

    /// `aprovado` when the score is strictly above `threshold`
    pub fn quality_status(&self, threshold: f64) -> &'static str {
        match self.score {
            Some(score) if score > threshold => "aprovado",
            _ => "rejeitado",
        }
    }

    /// Structured output stored by the host
    pub fn to_output(&self, threshold: f64) -> Value {
        json!({
            "pessoa": {
                "nome": self.nome,
                "cpf": self.cpf,
                "rg": self.rg,
                "data_nascimento": self.data_nascimento,
                "local_nascimento": self.local_nascimento,
                "filiacao": {"mae": self.filiacao_1, "pai": self.filiacao_2},
            },
            "habilitacao": {
                "categoria": self.categoria,
                "registro": self.registro,
                "data_emissao": self.data_emissao,
                "data_validade": self.data_validade,
            },
            "qualidade": {
                "score": self.score,
                "status": self.quality_status(threshold),
            },
        })
    }
}

/// Data decoded from the QR code on the back of a CNH
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VioData {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub data_nascimento: Option<String>,
    pub filiacao_1: Option<String>,
    pub filiacao_2: Option<String>,
    pub categoria: Option<String>,
    pub data_emissao: Option<String>,
    pub data_validade: Option<String>,
    pub registro: Option<String>,
    pub renach: Option<String>,
    pub local_uf: Option<String>,
    pub local_cidade: Option<String>,
    pub codigo_seguranca: Option<String>,
    pub observacoes: Option<String>,
    pub page_number: Option<i64>,
    pub tags: Option<Vec<String>>,
}

impl VioData {
    pub fn from_response(response: &ExtractionResponse) -> Self {
        let Some(result) = response.first() else {
            return VioData::default();
        };

        VioData {
            nome: result.last_field("nome"),
            cpf: result.last_field("cpf"),
            rg: result.last_field("rg"),
            data_nascimento: result.last_field("data_nascimento"),
            filiacao_1: result.last_field("filiacao_1"),
            filiacao_2: result.last_field("filiacao_2"),
            categoria: result.last_field("cat_hab"),
            data_emissao: result.last_field("data_emissao"),
            data_validade: result.last_field("data_validade"),
            registro: result.last_field("registro"),
            renach: result.last_field("renach"),
            local_uf: result.last_field("local_uf"),
            local_cidade: result.last_field("local_cidade"),
            codigo_seguranca: result.last_field("codigo_seguranca"),
            observacoes: result.last_field("observacoes"),
            page_number: result.page_number,
            tags: result.tags.clone(),
        }
    }

    pub fn is_identified(&self) -> bool {
        self.nome.is_some() || self.cpf.is_some()
    }

    /// Provenance attached to every QR-code outcome
    pub fn metadata(&self) -> Value {
        json!({
            "tags": self.tags,
            "pagina": self.page_number,
            "metodo": "mostQI_VIO_API",
        })
    }

    pub fn to_output(&self) -> Value {
        json!({
            "pessoa": {
                "nome": self.nome,
                "cpf": self.cpf,
                "rg": self.rg,
                "data_nascimento": self.data_nascimento,
                "filiacao": {"mae": self.filiacao_1, "pai": self.filiacao_2},
            },
            "habilitacao": {
                "categoria": self.categoria,
                "registro": self.registro,
                "renach": self.renach,
                "data_emissao": self.data_emissao,
                "data_validade": self.data_validade,
            },
            "documento": {
                "codigo_seguranca": self.codigo_seguranca,
                "observacoes": self.observacoes,
                "local_uf": self.local_uf,
                "local_cidade": self.local_cidade,
                "tags": self.tags,
                "pagina": self.page_number,
            },
        })
    }
}

/// `status` block the API attaches to liveness and biometrics replies
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ApiStatus {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of the liveness session creation endpoint
#[derive(Deserialize, Debug, Default, Clone)]
pub struct LivenessStartResponse {
    #[serde(default)]
    pub result: Option<LivenessSession>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LivenessSession {
    #[serde(default)]
    pub session_url: Option<String>,
    #[serde(default)]
    pub process_id: Option<String>,
}

/// Body of the liveness status endpoint
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LivenessStatusResponse {
    #[serde(default)]
    pub request_id: Option<Value>,
    #[serde(default)]
    pub status: Option<ApiStatus>,
    #[serde(default)]
    pub result: Option<Value>,
}

impl LivenessStatusResponse {
    fn result_value(&self, pointer: &str) -> Option<&Value> {
        self.result
            .as_ref()
            .and_then(|result| result.pointer(pointer))
            .filter(|value| !value.is_null())
    }

    /// Session status, `Indefinido` when the API does not report one
    pub fn session_status(&self) -> String {
        match self.result_value("/status") {
            Some(Value::String(status)) => status.clone(),
            Some(other) => other.to_string(),
            None => "Indefinido".to_string(),
        }
    }

    /// Liveness score, looked up in the places the API has reported it
    pub fn liveness_score(&self) -> f64 {
        ["/livenessScore", "/metrics/livenessScore", "/results/livenessScore"]
            .iter()
            .filter_map(|pointer| self.result_value(pointer))
            .filter_map(Value::as_f64)
            .find(|score| *score != 0.0)
            .unwrap_or(0.0)
    }

    /// Frontal image captured during the session, base64
    pub fn frontal_image(&self) -> Option<String> {
        self.result_value("/frontalImage")
            .and_then(Value::as_str)
            .filter(|image| !image.is_empty())
            .map(str::to_string)
    }
}

/// Body of the face comparison endpoint
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FaceCompareResponse {
    #[serde(default)]
    pub request_id: Option<Value>,
    #[serde(default)]
    pub status: Option<ApiStatus>,
    #[serde(default)]
    pub result: Option<FaceCompareResult>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct FaceCompareResult {
    #[serde(default)]
    pub similarity: Option<f64>,
}

impl FaceCompareResponse {
    pub fn similarity(&self) -> f64 {
        self.result
            .as_ref()
            .and_then(|result| result.similarity)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn front_response() -> ExtractionResponse {
        serde_json::from_value(json!({
            "result": [{
                "fields": [
                    {"name": "nome", "value": "MARIA DA SILVA"},
                    {"name": "cpf", "value": "123.456.789-00"},
                    {"name": "cat_hab", "value": "AB"},
                    {"name": "rg", "value": ""},
                    {"name": "registro", "value": null}
                ],
                "score": 0.93,
                "image": "aW1n"
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_cnh_data_skips_empty_fields() {
        let data = CnhData::from_response(&front_response());
        assert_eq!(data.nome.as_deref(), Some("MARIA DA SILVA"));
        assert_eq!(data.categoria.as_deref(), Some("AB"));
        assert!(data.rg.is_none());
        assert!(data.registro.is_none());
        assert_eq!(data.fields_extracted(), 4);
    }

    #[test]
    fn test_repeated_field_names() {
        let response: ExtractionResponse = serde_json::from_value(json!({
            "result": [{
                "fields": [
                    {"name": "nome", "value": "PRIMEIRO"},
                    {"name": "nome", "value": "SEGUNDO"},
                    {"name": "cpf", "value": "123.456.789-00"},
                    {"name": "cpf", "value": ""}
                ]
            }]
        }))
        .unwrap();

        let front = CnhData::from_response(&response);
        assert_eq!(front.nome.as_deref(), Some("SEGUNDO"));
        assert_eq!(front.cpf.as_deref(), Some("123.456.789-00"));

        let vio = VioData::from_response(&response);
        assert_eq!(vio.nome.as_deref(), Some("SEGUNDO"));
        assert!(vio.cpf.is_none());
    }

    #[test]
    fn test_cnh_quality_threshold_is_exclusive() {
        let mut data = CnhData::default();
        assert_eq!(data.quality_status(0.8), "rejeitado");
        data.score = Some(0.8);
        assert_eq!(data.quality_status(0.8), "rejeitado");
        data.score = Some(0.81);
        assert_eq!(data.quality_status(0.8), "aprovado");
    }

    #[test]
    fn test_empty_result_gives_empty_data() {
        let data = CnhData::from_response(&ExtractionResponse::default());
        assert!(!data.is_identified());
        assert_eq!(data.fields_extracted(), 0);
    }

    #[test]
    fn test_vio_output_layout() {
        let response: ExtractionResponse = serde_json::from_value(json!({
            "result": [{
                "fields": [
                    {"name": "cpf", "value": "123"},
                    {"name": "renach", "value": "SP123"}
                ],
                "pageNumber": 2,
                "tags": ["cnh"]
            }]
        }))
        .unwrap();
        let data = VioData::from_response(&response);
        let output = data.to_output();
        assert_eq!(output["habilitacao"]["renach"], "SP123");
        assert_eq!(output["documento"]["pagina"], 2);
        assert_eq!(data.metadata()["metodo"], "mostQI_VIO_API");
    }

    #[test]
    fn test_liveness_score_fallbacks() {
        let response: LivenessStatusResponse = serde_json::from_value(json!({
            "result": {"status": "Finished", "metrics": {"livenessScore": 0.97}}
        }))
        .unwrap();
        assert_eq!(response.liveness_score(), 0.97);
        assert_eq!(response.session_status(), "Finished");
        assert!(response.frontal_image().is_none());

        let empty = LivenessStatusResponse::default();
        assert_eq!(empty.liveness_score(), 0.0);
        assert_eq!(empty.session_status(), "Indefinido");
    }

    #[test]
    fn test_face_similarity_defaults_to_zero() {
        assert_eq!(FaceCompareResponse::default().similarity(), 0.0);
    }
}
