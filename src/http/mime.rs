//! MIME type lookup by file extension.

/// Maps a file extension (with leading dot) to a MIME type.
pub fn from_extension(ext: &str) -> &'static str {
    match ext {
        ".js" => "application/javascript",
        ".css" => "text/css",
        ".html" | ".htm" => "text/html",
        ".json" => "application/json",
        ".txt" => "text/plain",
        ".xml" => "application/xml",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".svg" => "image/svg+xml",
        ".ico" => "image/x-icon",
        ".woff" => "font/woff",
        ".woff2" => "font/woff2",
        ".ttf" => "font/ttf",
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".xls" => "application/vnd.ms-excel",
        ".xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".mp3" => "audio/mpeg",
        ".mp4" => "video/mp4",
        ".mkv" => "video/x-matroska",
        ".avi" => "video/x-msvideo",
        ".zip" => "application/zip",
        ".7z" => "application/x-7z-compressed",
        ".rar" => "application/vnd.rar",
        ".apk" => "application/vnd.android.package-archive",
        ".ipa" => "application/octet-stream",
        _ => "application/octet-stream",
    }
}

/// MIME type for a file name, falling back to octet-stream when there is
/// no extension.
pub fn for_file_name(name: &str) -> &'static str {
    match name.rfind('.') {
        Some(idx) => from_extension(&name[idx..]),
        None => "application/octet-stream",
    }
}
