use crate::domain::pipeline::RunSummary;
use crate::error::AppError;
use std::path::Path;
use tokio::fs;

/// Read the input document as UTF-8 text
pub async fn read_document(path: &Path) -> Result<String, AppError> {
    let document = fs::read_to_string(path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read input document");
        AppError::Io(e)
    })?;

    tracing::info!(
        path = %path.display(),
        document_length = document.len(),
        "Input document loaded"
    );

    Ok(document)
}

/// Write the assembled audio, replacing any previous file at `path`
pub async fn write_audio(path: &Path, audio: &[u8]) -> Result<(), AppError> {
    write_replacing(path, audio).await?;

    tracing::info!(
        path = %path.display(),
        audio_size_bytes = audio.len(),
        "Audio written"
    );

    Ok(())
}

/// Write the run summary as pretty-printed JSON
pub async fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let json = serde_json::to_vec_pretty(summary)?;
    write_replacing(path, &json).await?;

    tracing::info!(
        path = %path.display(),
        run_id = %summary.run_id,
        failed = summary.failures.len(),
        "Run summary written"
    );

    Ok(())
}

/// Write to a sibling temp file and rename, so readers never see a partial file
async fn write_replacing(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".partial");
    let temp_path = Path::new(&temp_name);

    fs::write(temp_path, bytes).await?;
    fs::rename(temp_path, path).await?;

    Ok(())
}
