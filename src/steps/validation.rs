//! Final validation step
//!
//! Cross-checks the data read from the front of the CNH against the QR code
//! and summarises the biometric results. Runs locally, no API calls.

use serde::{Deserialize, Serialize};

use crate::utils::round2;

/// Share of matching fields required to approve the document data, in percent
pub const DATA_APPROVAL_PERCENT: f64 = 75.0;
/// Liveness score required for approval
pub const LIVENESS_APPROVAL_SCORE: f64 = 0.80;

/// Document fields as produced by one of the extraction steps
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DocumentFields {
    pub nome: String,
    pub cpf: String,
    pub data_nascimento: String,
    pub filiacao_1: String,
    pub filiacao_2: String,
    pub rg: String,
    pub registro: String,
    pub data_emissao: String,
    pub data_validade: String,
    pub categoria: String,
}

/// Everything collected by the earlier steps
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct ValidationInput {
    pub frente: DocumentFields,
    pub qrcode: DocumentFields,
    pub liveness_score: f64,
    /// Similarity percentage reported by the face match step
    pub facematch_score: f64,
    pub facematch_aprovado: bool,
}

/// One compared field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldComparison {
    pub label: &'static str,
    pub front: String,
    pub qrcode: String,
    pub matches: bool,
}

/// Final verdict handed to the host
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub score_dados: f64,
    pub aprovado_dados: bool,
    pub aprovado_liveness: bool,
    pub aprovado_facematch: bool,
    pub mensagem_resultado_final: String,
}

impl ValidationReport {
    pub fn is_approved(&self) -> bool {
        self.aprovado_dados && self.aprovado_liveness && self.aprovado_facematch
    }
}

/// Lowercases and drops spaces, dots, dashes and slashes
pub fn normalize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | '-' | '/'))
        .collect()
}

fn same(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Pairs up the fields of both sources
pub fn compare_fields(front: &DocumentFields, qrcode: &DocumentFields) -> Vec<FieldComparison> {
    let pair = |label, a: &String, b: &String, matches: bool| FieldComparison {
        label,
        front: a.clone(),
        qrcode: b.clone(),
        matches,
    };

    // The RG on the front often carries the issuing agency, the QR code does not
    let rg_matches = same(&front.rg, &qrcode.rg)
        || front.rg.contains(qrcode.rg.as_str())
        || qrcode.rg.contains(front.rg.as_str());

    vec![
        pair("Nome", &front.nome, &qrcode.nome, same(&front.nome, &qrcode.nome)),
        pair("CPF", &front.cpf, &qrcode.cpf, same(&front.cpf, &qrcode.cpf)),
        pair(
            "Data de nascimento",
            &front.data_nascimento,
            &qrcode.data_nascimento,
            same(&front.data_nascimento, &qrcode.data_nascimento),
        ),
        pair(
            "Filiação mãe",
            &front.filiacao_1,
            &qrcode.filiacao_1,
            same(&front.filiacao_1, &qrcode.filiacao_1),
        ),
        pair(
            "Filiação pai",
            &front.filiacao_2,
            &qrcode.filiacao_2,
            same(&front.filiacao_2, &qrcode.filiacao_2),
        ),
        pair("RG", &front.rg, &qrcode.rg, rg_matches),
        pair(
            "Registro CNH",
            &front.registro,
            &qrcode.registro,
            same(&front.registro, &qrcode.registro),
        ),
        pair(
            "Data de emissão",
            &front.data_emissao,
            &qrcode.data_emissao,
            same(&front.data_emissao, &qrcode.data_emissao),
        ),
        pair(
            "Data de validade",
            &front.data_validade,
            &qrcode.data_validade,
            same(&front.data_validade, &qrcode.data_validade),
        ),
        pair(
            "Categoria de habilitação",
            &front.categoria,
            &qrcode.categoria,
            same(&front.categoria, &qrcode.categoria),
        ),
    ]
}

fn mark(ok: bool) -> &'static str {
    if ok { "✅" } else { "❌" }
}

/// Builds the final report
pub fn validate(input: &ValidationInput) -> ValidationReport {
    let comparisons = compare_fields(&input.frente, &input.qrcode);
    let hits = comparisons.iter().filter(|c| c.matches).count();
    let score = round2(hits as f64 / comparisons.len() as f64 * 100.0);
    let liveness_approved = input.liveness_score >= LIVENESS_APPROVAL_SCORE;

    let mut data_section =
        String::from("### 🔎 Comparativo entre Dados da Frente da CNH e Dados do QR Code\n");
    for c in &comparisons {
        data_section.push_str(&format!(
            "- {}: {}\n  - Frente da CNH: `{}`\n  - QR Code: `{}`\n",
            c.label,
            mark(c.matches),
            c.front,
            c.qrcode
        ));
    }

    let facematch_section = format!(
        "### 🧑‍🦲 Similaridade Facial (FaceMatch)\n\
         - Similaridade: {:?}%\n\
         - Aprovado: {}",
        round2(input.facematch_score),
        if input.facematch_aprovado { "✅ Sim" } else { "❌ Não" }
    );

    let liveness_section = format!(
        "### 👁️ Verificação de Prova de Vida (Liveness)\n\
         - Score de vivacidade: {:?}%\n\
         - Resultado: {}",
        round2(input.liveness_score * 100.0),
        if liveness_approved {
            "🟢 Prova de vida aprovada"
        } else {
            "🔴 Prova de vida reprovada"
        }
    );

    let message = format!(
        "📋 **Resumo da Validação da CNH**\n\n{}\n\n{}\n\n{}",
        data_section.trim_end(),
        facematch_section,
        liveness_section
    );

    ValidationReport {
        score_dados: score,
        aprovado_dados: score >= DATA_APPROVAL_PERCENT,
        aprovado_liveness: liveness_approved,
        aprovado_facematch: input.facematch_aprovado,
        mensagem_resultado_final: message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> DocumentFields {
        DocumentFields {
            nome: "MARIA DA SILVA".into(),
            cpf: "123.456.789-00".into(),
            data_nascimento: "01/02/1990".into(),
            filiacao_1: "ANA DA SILVA".into(),
            filiacao_2: "JOSE DA SILVA".into(),
            rg: "1234567 SSP SP".into(),
            registro: "01234567890".into(),
            data_emissao: "10/10/2020".into(),
            data_validade: "10/10/2030".into(),
            categoria: "AB".into(),
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" 123.456.789-00 "), "12345678900");
        assert_eq!(normalize("01/02/1990"), "01021990");
        assert_eq!(normalize("Maria Da Silva"), "mariadasilva");
    }

    #[test]
    fn test_rg_matches_by_containment() {
        let front = fields();
        let qrcode = DocumentFields {
            rg: "1234567".into(),
            cpf: "12345678900".into(),
            ..fields()
        };
        let comparisons = compare_fields(&front, &qrcode);
        assert!(comparisons.iter().all(|c| c.matches));
    }

    #[test]
    fn test_full_approval() {
        let input = ValidationInput {
            frente: fields(),
            qrcode: fields(),
            liveness_score: 0.95,
            facematch_score: 91.237,
            facematch_aprovado: true,
        };
        let report = validate(&input);

        assert_eq!(report.score_dados, 100.0);
        assert!(report.is_approved());
        assert!(report.mensagem_resultado_final.starts_with("📋 **Resumo da Validação da CNH**"));
        assert!(report.mensagem_resultado_final.contains("- Similaridade: 91.24%"));
        assert!(report.mensagem_resultado_final.contains("- Score de vivacidade: 95.0%"));
        assert!(report.mensagem_resultado_final.contains("🟢 Prova de vida aprovada"));
    }

    #[test]
    fn test_data_score_below_threshold() {
        let qrcode = DocumentFields {
            nome: "OUTRA PESSOA".into(),
            cpf: "999".into(),
            data_nascimento: "03/04/1980".into(),
            ..fields()
        };
        let input = ValidationInput {
            frente: fields(),
            qrcode,
            liveness_score: 0.5,
            ..ValidationInput::default()
        };
        let report = validate(&input);

        assert_eq!(report.score_dados, 70.0);
        assert!(!report.aprovado_dados);
        assert!(!report.aprovado_liveness);
        assert!(report.mensagem_resultado_final.contains("- Nome: ❌"));
        assert!(report.mensagem_resultado_final.contains("🔴 Prova de vida reprovada"));
    }
}
