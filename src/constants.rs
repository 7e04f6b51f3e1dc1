/// Constants used throughout the application
///
/// This module centralises all constants used in the application to make
/// them easier to manage and update.

/// Qualifier string used for application identification
pub const QUALIFIER: &str = "br";

/// Organisation name used for application identification
pub const ORGANIZATION: &str = "mostQI Connect";

/// Application name used for identification
///
/// This is the name of the application used in various contexts like
/// configuration file paths and application identification.
pub const APPLICATION: &str = "cnh_validator";

/// Help text for the config command-line option
pub const CONFIG_HELP: &str = "Read from a specific config file";

/// Help text for the verbose command-line option
pub const VERBOSE_HELP: &str = "Increase verbosity level (can be used multiple times)";

/// Help text for the log file command-line option
pub const LOG_FILE_HELP: &str = "Write logs to a specific file";

/// Help text for the local logging command-line option
pub const LOCAL_LOGGING_HELP: &str = "Keep the log file in the working directory";

pub const CLIENT_KEY_HELP: &str = "mostQI client key (defaults to `mostqi.client_key` from the config)";
pub const RESUME_HELP: &str = "Use this resume URL instead of asking the host engine";
pub const CANCEL_HELP: &str = "Use this cancel URL instead of asking the host engine";
pub const APPROVER_HELP: &str = "Approver name sent to the host engine";
pub const IMAGE_HELP: &str = "Image as a file path, base64 or data URI";
pub const PROCESS_ID_HELP: &str = "Process id returned by liveness-start";
pub const FACE_A_HELP: &str = "Portrait from the CNH as a file path, base64 or data URI";
pub const FACE_B_HELP: &str = "Liveness frontal image as base64, or a file holding it";
pub const SESSION_URL_HELP: &str = "Session link returned by liveness-start";
pub const VALIDATION_INPUT_HELP: &str = "JSON file with the data collected by the earlier steps";

/// Default path for the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Default log file name
pub const LOG_FILE_DEFAULT: &str = "cnh_validator.log";

/// Welcome message shown before the validation flow starts
pub const WELCOME_DESCRIPTION: &str = "Bem-vindo ao Validador de CNH - mostQI Connect\n\n\
Este fluxo irá conduzir você pelas etapas de validação automatizada da sua CNH, utilizando as APIs da mostQI.\n\n\
Você precisará fornecer:\n\
- Imagem da frente da CNH\n\
- Imagem do verso com QR Code\n\
- Vídeo para verificação de vivacidade\n\n\
Para iniciar o processo, clique em Resume.\n\
Para cancelar, clique em Cancel.";

/// Heading of the front-image instructions
pub const FRONT_TITLE: &str = "Como tirar a foto da CNH";

/// Lines of the front-image instructions, joined with line breaks
pub const FRONT_GUIDELINES: [&str; 7] = [
    "Antes de enviar a imagem da frente da CNH, siga estas orientações:",
    "- Coloque o documento sobre uma superfície plana e bem iluminada",
    "- Evite reflexos ou sombras",
    "- Certifique-se de que todos os dados estejam legíveis",
    "- Use uma boa resolução (preferencialmente com o celular na horizontal)",
    "",
    "Quando estiver pronto, clique em **resume** para enviar a imagem.",
];

/// Back/QR-code instructions; the heading is the first line
pub const QRCODE_DESCRIPTION: &str = "Como tirar a foto do QR Code (verso da CNH)\n\n\
Antes de enviar a imagem do verso da CNH, siga estas orientações:\n\
- Coloque o documento sobre uma superfície plana e bem iluminada\n\
- Verifique se o QR Code está totalmente visível\n\
- Evite reflexos, sombras ou cortes\n\
- Utilize uma câmera com boa qualidade e foco\n\n\
Quando estiver pronto, clique em 'Resume' para enviar a imagem.";

/// Heading of the liveness instructions
pub const LIVENESS_INSTRUCTIONS_TITLE: &str = "Etapa de Verificação de Vivacidade";

/// Liveness instructions before and after the session link
pub const LIVENESS_INSTRUCTIONS_INTRO: &str = "VERIFICAÇÃO DE VIVACIDADE OBRIGATÓRIA\n\n\
Por favor, siga os passos abaixo para continuar:\n\n\
1. Copie e cole o link abaixo no navegador para iniciar a verificação:\n";
pub const LIVENESS_INSTRUCTIONS_OUTRO: &str = "\n\n\
2. Siga as instruções exibidas na tela.\n\
3. Após concluir a verificação, volte aqui e clique no botão 'Resume' para prosseguir com o fluxo.";

/// Default base URL of the mostQI API
pub const DEFAULT_API_URL: &str = "https://mostqiapi.com";

/// User agent sent to the mostQI API
pub const USER_AGENT: &str = "CNH-Validation-Workflow/1.0";

/// Timeout for document processing requests, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for authentication requests, in seconds
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 10;

/// Minimum extraction score for a CNH image to be approved (exclusive)
pub const DEFAULT_EXTRACTION_APPROVAL_SCORE: f64 = 0.8;

/// Minimum facial similarity for a match to be approved (inclusive)
pub const DEFAULT_FACE_MATCH_THRESHOLD: f64 = 0.70;

/// Document tags sent with a front-image extraction
pub const CNH_EXTRACTION_TAGS: [&str; 3] =
    ["id=bra-cnh-3", "language=pt-BR", "type=documento-pessoal"];

pub const AUTH_PATH: &str = "/user/authenticate";
pub const CONTENT_EXTRACTION_PATH: &str = "/process-image/content-extraction";
pub const VIO_EXTRACTION_PATH: &str = "/process-image/vio-extraction";
pub const LIVENESS_START_PATH: &str = "/liveness/streaming/async";
pub const LIVENESS_STATUS_PATH: &str = "/liveness/streaming/async/status";
pub const FACE_COMPARE_PATH: &str = "/process-image/biometrics/face-compare";
