// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MIME classification of downloaded attachments.
//!
//! Three sources are consulted in order, first match wins: the leading
//! bytes of the body, the extension of the URL path, and the response's
//! `Content-Type` header.

/// A recognised file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileType {
    pub mime: &'static str,
    pub extension: &'static str,
}

const fn ft(mime: &'static str, extension: &'static str) -> FileType {
    FileType { mime, extension }
}

const JPEG: FileType = ft("image/jpeg", "jpg");
const PNG: FileType = ft("image/png", "png");
const GIF: FileType = ft("image/gif", "gif");
const WEBP: FileType = ft("image/webp", "webp");
const BMP: FileType = ft("image/bmp", "bmp");
const TIFF: FileType = ft("image/tiff", "tif");
const ICO: FileType = ft("image/x-icon", "ico");
const PDF: FileType = ft("application/pdf", "pdf");
const MP3: FileType = ft("audio/mpeg", "mp3");
const M4A: FileType = ft("audio/m4a", "m4a");
const MP4: FileType = ft("video/mp4", "mp4");
const THREE_GP: FileType = ft("video/3gpp", "3gp");
const MOV: FileType = ft("video/quicktime", "mov");
const OGG: FileType = ft("audio/ogg", "ogg");
const WAV: FileType = ft("audio/x-wav", "wav");
const AVI: FileType = ft("video/x-msvideo", "avi");
const AMR: FileType = ft("audio/amr", "amr");
const FLAC: FileType = ft("audio/x-flac", "flac");
const MIDI: FileType = ft("audio/midi", "mid");
const WEBM: FileType = ft("video/webm", "webm");
const MKV: FileType = ft("video/x-matroska", "mkv");
const ZIP: FileType = ft("application/zip", "zip");
const GZIP: FileType = ft("application/gzip", "gz");

/// Identifies a binary format from its signature.
pub fn sniff(head: &[u8]) -> Option<FileType> {
    let at = |offset: usize, magic: &[u8]| head.get(offset..offset + magic.len()) == Some(magic);

    if at(0, &[0xFF, 0xD8, 0xFF]) {
        return Some(JPEG);
    }
    if at(0, &[0x89, b'P', b'N', b'G']) {
        return Some(PNG);
    }
    if at(0, b"GIF8") {
        return Some(GIF);
    }
    if at(0, b"RIFF") {
        return match head.get(8..12) {
            Some(b"WEBP") => Some(WEBP),
            Some(b"WAVE") => Some(WAV),
            Some(b"AVI ") => Some(AVI),
            _ => None,
        };
    }
    if at(0, b"BM") {
        return Some(BMP);
    }
    if at(0, b"II*\0") || at(0, b"MM\0*") {
        return Some(TIFF);
    }
    if at(0, &[0x00, 0x00, 0x01, 0x00]) {
        return Some(ICO);
    }
    if at(0, b"%PDF") {
        return Some(PDF);
    }
    if at(0, b"ID3") || at(0, &[0xFF, 0xFB]) || at(0, &[0xFF, 0xF3]) || at(0, &[0xFF, 0xF2]) {
        return Some(MP3);
    }
    if at(4, b"ftyp") {
        return Some(match head.get(8..12) {
            Some(b"M4A ") => M4A,
            Some(b"qt  ") => MOV,
            Some(brand) if brand.starts_with(b"3g") => THREE_GP,
            _ => MP4,
        });
    }
    if at(0, b"OggS") {
        return Some(OGG);
    }
    if at(0, b"#!AMR") {
        return Some(AMR);
    }
    if at(0, b"fLaC") {
        return Some(FLAC);
    }
    if at(0, b"MThd") {
        return Some(MIDI);
    }
    if at(0, &[0x1A, 0x45, 0xDF, 0xA3]) {
        let is_webm = head.windows(4).any(|w| w == b"webm");
        return Some(if is_webm { WEBM } else { MKV });
    }
    if at(0, b"PK\x03\x04") {
        return Some(ZIP);
    }
    if at(0, &[0x1F, 0x8B, 0x08]) {
        return Some(GZIP);
    }
    None
}

/// Formats recognised by file extension.
const BY_EXTENSION: &[(&str, FileType)] = &[
    ("jpg", JPEG),
    ("jpeg", JPEG),
    ("png", PNG),
    ("gif", GIF),
    ("webp", WEBP),
    ("bmp", BMP),
    ("tif", TIFF),
    ("tiff", TIFF),
    ("ico", ICO),
    ("pdf", PDF),
    ("mp3", MP3),
    ("m4a", M4A),
    ("mp4", MP4),
    ("3gp", THREE_GP),
    ("mov", MOV),
    ("ogg", OGG),
    ("oga", OGG),
    ("wav", WAV),
    ("avi", AVI),
    ("amr", AMR),
    ("flac", FLAC),
    ("mid", MIDI),
    ("midi", MIDI),
    ("webm", WEBM),
    ("mkv", MKV),
    ("zip", ZIP),
    ("gz", GZIP),
];

pub fn from_extension(extension: &str) -> Option<FileType> {
    BY_EXTENSION
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, file_type)| *file_type)
}

/// Registered extension per MIME type, consulted when only a header is known.
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/bmp", "bmp"),
    ("image/tiff", "tif"),
    ("image/svg+xml", "svg"),
    ("application/pdf", "pdf"),
    ("application/json", "json"),
    ("application/zip", "zip"),
    ("application/gzip", "gz"),
    ("application/msword", "doc"),
    ("application/vnd.openxmlformats-officedocument.wordprocessingml.document", "docx"),
    ("audio/mpeg", "mp3"),
    ("audio/mp3", "mp3"),
    ("audio/mp4", "m4a"),
    ("audio/m4a", "m4a"),
    ("audio/aac", "aac"),
    ("audio/ogg", "ogg"),
    ("audio/opus", "opus"),
    ("audio/amr", "amr"),
    ("audio/wav", "wav"),
    ("audio/x-wav", "wav"),
    ("audio/webm", "webm"),
    ("video/mp4", "mp4"),
    ("video/3gpp", "3gp"),
    ("video/quicktime", "mov"),
    ("video/webm", "webm"),
    ("text/plain", "txt"),
    ("text/csv", "csv"),
    ("text/html", "html"),
    ("text/vcard", "vcf"),
    ("text/x-vcard", "vcf"),
    ("text/calendar", "ics"),
];

pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    MIME_EXTENSIONS
        .iter()
        .find(|(registered, _)| registered.eq_ignore_ascii_case(mime))
        .map(|(_, ext)| *ext)
}

/// The media type of a `Content-Type` value, lowercased and without
/// parameters. `None` unless it has the `type/subtype` shape.
pub fn parse_media_type(header: &str) -> Option<String> {
    let essence = header.split(';').next().unwrap_or(header).trim();
    let (kind, subtype) = essence.split_once('/')?;
    let valid = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    if valid(kind) && valid(subtype) {
        Some(essence.to_ascii_lowercase())
    } else {
        None
    }
}

/// Result of classification. Either field may be empty when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub content_type: String,
    pub extension: String,
}

/// Classifies a body given the sniffable head, the URL path's extension
/// (possibly empty) and the `Content-Type` header, if any.
///
/// An unrecognised URL extension is kept as the stored extension.
pub fn classify(head: &[u8], url_extension: &str, content_type: Option<&str>) -> Classification {
    if let Some(found) = sniff(head).or_else(|| from_extension(url_extension)) {
        return Classification {
            content_type: found.mime.to_string(),
            extension: found.extension.to_string(),
        };
    }

    let content_type = content_type.and_then(parse_media_type).unwrap_or_default();
    let extension = if url_extension.is_empty() {
        extension_for_mime(&content_type).unwrap_or_default().to_string()
    } else {
        url_extension.to_string()
    };
    Classification {
        content_type,
        extension,
    }
}
