// Prefix Database Loader
//
// Parses the CTY.DAT country file used by contest loggers into a LookupTable.
//
// Format: one record per entity, colon-separated header fields followed by a
// comma-separated alias list terminated with ';'. Records may span lines.
//
// 0: Entity Name
// 1: CQ Zone
// 2: ITU Zone
// 3: Continent (2-letter code)
// 4: Latitude (degrees, north positive)
// 5: Longitude (degrees, WEST positive)
// 6: UTC offset (hours)
// 7: Primary prefix ('*' marks an entity that only exists on the WAE list)
// 8: Aliases (the only keys indexed), e.g.  K,W,=W1AW,KG4(8)[11],AH6<21.3/157.9>{OC}~-10~
//
// Alias markers:
//   =call     exact full callsign, not a prefix
//   (n)       CQ zone override
//   [n]       ITU zone override
//   <lat/lon> coordinate override
//   {cc}      continent override
//   ~n~       UTC offset override

use std::fs;
use std::path::Path;

use super::{AliasOverrides, EntityRecord, LookupTable};
use crate::error::{ContestError, Result};

/// A parsed alias: key, exact-call flag, overrides
type Alias = (String, bool, AliasOverrides);

impl LookupTable {
    /// Build the table from CTY.DAT text
    ///
    /// Malformed records are skipped with a warning. A database with no
    /// usable DXCC record is fatal.
    pub fn from_cty_str(content: &str) -> Result<Self> {
        let mut table = LookupTable::default();
        let mut record_count = 0;
        let mut skipped = 0;

        for chunk in content.split(';') {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            record_count += 1;

            match parse_record(chunk) {
                Ok((record, aliases)) => table.add_entity(record, aliases),
                Err(reason) => {
                    skipped += 1;
                    log::warn!(
                        "Skipping prefix database record {} ({}): {}",
                        record_count,
                        first_line(chunk),
                        reason
                    );
                }
            }
        }

        log::info!(
            "Parsed {} prefix database records, {} skipped: {} entities, {} prefixes, {} exact calls",
            record_count,
            skipped,
            table.entity_count(),
            table.prefix_count(),
            table.exact_count()
        );

        if table.entity_count() == 0 {
            return Err(ContestError::EmptyDatabase);
        }
        Ok(table)
    }

    /// Read and parse a CTY.DAT file
    pub fn from_path(path: &Path) -> Result<Self> {
        log::info!("Loading prefix database: {:?}", path);
        let content = fs::read_to_string(path).map_err(|source| ContestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_cty_str(&content)
    }
}

/// Parse one ';'-terminated record into the entity and its aliases
fn parse_record(chunk: &str) -> std::result::Result<(EntityRecord, Vec<Alias>), String> {
    let fields: Vec<&str> = chunk.splitn(9, ':').map(str::trim).collect();
    if fields.len() < 9 {
        return Err(format!("expected 8 header fields, found {}", fields.len() - 1));
    }

    let name = fields[0].to_string();
    if name.is_empty() {
        return Err("empty entity name".to_string());
    }
    let cq_zone = parse_field::<u8>(fields[1], "CQ zone")?;
    let itu_zone = parse_field::<u8>(fields[2], "ITU zone")?;
    let continent = fields[3].to_uppercase();
    let latitude = parse_field::<f64>(fields[4], "latitude")?;
    let longitude = -parse_field::<f64>(fields[5], "longitude")?;
    let utc_offset = parse_field::<f32>(fields[6], "UTC offset")?;

    let (prefix, wae_only) = match fields[7].strip_prefix('*') {
        Some(p) => (p.to_uppercase(), true),
        None => (fields[7].to_uppercase(), false),
    };
    if prefix.is_empty() {
        return Err("empty primary prefix".to_string());
    }

    let mut aliases: Vec<Alias> = Vec::new();
    for token in fields[8].split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_alias(token) {
            Ok(alias) => aliases.push(alias),
            Err(reason) => log::warn!("Skipping alias '{}' of {}: {}", token, name, reason),
        }
    }

    let record = EntityRecord {
        name,
        prefix,
        cq_zone,
        itu_zone,
        continent,
        latitude,
        longitude,
        utc_offset,
        wae_only,
    };
    Ok((record, aliases))
}

/// Parse an alias token such as `=W1AW/KH6(31)[61]`
fn parse_alias(token: &str) -> std::result::Result<Alias, String> {
    let (exact, body) = match token.strip_prefix('=') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let key_end = body
        .find(|c| matches!(c, '(' | '[' | '<' | '{' | '~'))
        .unwrap_or(body.len());
    let key = body[..key_end].trim().to_uppercase();
    if key.is_empty() {
        return Err("empty key".to_string());
    }

    let mut overrides = AliasOverrides::default();
    let mut rest = &body[key_end..];
    while let Some(open) = rest.chars().next() {
        let close = match open {
            '(' => ')',
            '[' => ']',
            '<' => '>',
            '{' => '}',
            '~' => '~',
            other => return Err(format!("unexpected '{}'", other)),
        };
        let end = rest[1..]
            .find(close)
            .map(|i| i + 1)
            .ok_or_else(|| format!("unterminated '{}'", open))?;
        let value = rest[1..end].trim();

        match open {
            '(' => overrides.cq_zone = Some(parse_field(value, "CQ zone override")?),
            '[' => overrides.itu_zone = Some(parse_field(value, "ITU zone override")?),
            '<' => {
                let (lat, lon) = value
                    .split_once('/')
                    .ok_or_else(|| format!("bad coordinates '{}'", value))?;
                let lat = parse_field::<f64>(lat, "latitude override")?;
                let lon = parse_field::<f64>(lon, "longitude override")?;
                overrides.coordinates = Some((lat, -lon));
            }
            '{' => overrides.continent = Some(value.to_uppercase()),
            _ => overrides.utc_offset = Some(parse_field(value, "UTC offset override")?),
        }
        rest = &rest[end + 1..];
    }

    Ok((key, exact, overrides))
}

fn parse_field<T: std::str::FromStr>(value: &str, what: &str) -> std::result::Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {} '{}'", what, value.trim()))
}

fn first_line(chunk: &str) -> &str {
    chunk.lines().next().unwrap_or(chunk).trim()
}
