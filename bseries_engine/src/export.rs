/// Engine v1 — Kernel Export
///
/// Three formats, dispatched by name. The ggml and scheme templates are
/// whitespace-exact; json is the full structural dump and round-trips
/// through serde.

use crate::error::EngineError;
use crate::kernel::Kernel;

/// Serialize a kernel in the named format.
pub fn export(kernel: &Kernel, format: &str) -> Result<String, EngineError> {
    match format {
        "json" => export_json(kernel),
        "ggml" => Ok(export_ggml(kernel)),
        "scheme" => Ok(export_scheme(kernel)),
        other => Err(EngineError::UnknownFormat(other.to_string())),
    }
}

/// Pretty-printed (2-space indent) full structural dump.
fn export_json(kernel: &Kernel) -> Result<String, EngineError> {
    Ok(serde_json::to_string_pretty(kernel)?)
}

fn coefficient_list(kernel: &Kernel, separator: &str) -> String {
    kernel
        .coefficients
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<String>>()
        .join(separator)
}

fn export_ggml(kernel: &Kernel) -> String {
    format!(
        "GGML Kernel {}\nOrder: {}\nCoefficients: [{}]\nGrip: {:.4}\nTrees: {}\n",
        kernel.spec.domain,
        kernel.order,
        coefficient_list(kernel, ", "),
        kernel.grip.overall,
        kernel.trees.len(),
    )
}

fn export_scheme(kernel: &Kernel) -> String {
    format!(
        "(define {}-kernel\n  '((order . {})\n    (trees . {})\n    (coefficients . ({}))\n    (grip . {:.4})\n    (symmetry . \"{}\")))\n",
        kernel.spec.domain,
        kernel.order,
        kernel.trees.len(),
        coefficient_list(kernel, " "),
        kernel.grip.overall,
        kernel.spec.symmetry,
    )
}
