use std::fmt::Display;

use mt_api::{error_detail, CompileFailure};
use mt_core::DialogueError;

fn map_error(code: &'static str, error: impl Display) -> DialogueError {
    DialogueError::internal(code, error.to_string())
}

pub(crate) fn map_cli_output_encode(error: serde_json::Error) -> DialogueError {
    map_error("CLI_OUTPUT_ENCODE", error)
}

fn json_line(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"Unknown error\"".to_string())
}

pub(crate) fn emit_error(failure: &CompileFailure) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", failure.error.code);
    println!("ERROR_STATUS:{}", failure.status_code());
    println!("ERROR_MSG_JSON:{}", json_line(&error_detail(&failure.error)));
    for line in &failure.logs {
        println!("LOG:{}", line);
    }
    1
}
