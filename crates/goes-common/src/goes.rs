//! GOES-R ABI product filename metadata.
//!
//! NOAA names ABI files like
//! `OR_ABI-L2-CMIPF-M6C13_G19_s20251231200205_e20251231209513_c20251231209581.nc`:
//! system environment, instrument/level/product, scan mode and channel,
//! satellite, then scan start, end and creation times as `YYYYJJJHHMMSSt`
//! (day of year, tenths of a second).

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{FieldError, FieldResult};

/// ABI scene coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoesScene {
    FullDisk,
    Conus,
    Mesoscale1,
    Mesoscale2,
    Unknown,
}

impl GoesScene {
    fn from_product(product: &str) -> Self {
        if product.ends_with("M1") {
            Self::Mesoscale1
        } else if product.ends_with("M2") {
            Self::Mesoscale2
        } else if product.ends_with('F') {
            Self::FullDisk
        } else if product.ends_with('C') {
            Self::Conus
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullDisk => "Full Disk",
            Self::Conus => "CONUS",
            Self::Mesoscale1 => "Mesoscale 1",
            Self::Mesoscale2 => "Mesoscale 2",
            Self::Unknown => "Unknown",
        }
    }
}

/// Metadata parsed from a GOES ABI filename.
#[derive(Debug, Clone, PartialEq)]
pub struct GoesFileInfo {
    /// e.g. "ABI-L2-CMIPF"
    pub product: String,
    pub scene: GoesScene,
    /// Scan mode number (6 for the current timeline)
    pub mode: Option<u8>,
    /// ABI band 1-16, absent for multi-band products
    pub channel: Option<u8>,
    /// e.g. "G19"
    pub satellite: String,
    pub scan_start: DateTime<Utc>,
    pub scan_end: Option<DateTime<Utc>>,
}

impl GoesFileInfo {
    /// Parse a bare filename or a path/URL ending in one.
    pub fn parse(name: &str) -> FieldResult<Self> {
        let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
        let stem = file.split('.').next().unwrap_or(file);
        let invalid = |reason: &str| FieldError::InvalidFilename {
            name: file.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() < 4 {
            return Err(invalid("expected at least 4 '_'-separated parts"));
        }

        let (product, mode, channel) = match parts[1].rsplit_once('-') {
            Some((product, mode_channel)) if mode_channel.starts_with('M') => {
                let (mode, channel) = parse_mode_channel(mode_channel);
                (product.to_string(), mode, channel)
            }
            _ => (parts[1].to_string(), None, None),
        };

        let satellite = parts[2].to_string();
        if !satellite.starts_with('G') {
            return Err(invalid("satellite id must start with 'G'"));
        }

        let scan_start = parts
            .iter()
            .find_map(|p| p.strip_prefix('s'))
            .ok_or_else(|| invalid("missing scan start"))
            .and_then(|s| parse_scan_time(s).ok_or_else(|| invalid("bad scan start time")))?;
        let scan_end = parts
            .iter()
            .find_map(|p| p.strip_prefix('e'))
            .and_then(parse_scan_time);

        Ok(Self {
            scene: GoesScene::from_product(&product),
            product,
            mode,
            channel,
            satellite,
            scan_start,
            scan_end,
        })
    }

    /// Short human-readable title, e.g. `G19 ABI-L2-CMIPF C13 2025-05-03 12:00 UTC`.
    pub fn title(&self) -> String {
        let channel = self
            .channel
            .map(|c| format!(" C{:02}", c))
            .unwrap_or_default();
        format!(
            "{} {}{} {}",
            self.satellite,
            self.product,
            channel,
            self.scan_start.format("%Y-%m-%d %H:%M UTC")
        )
    }
}

fn parse_mode_channel(s: &str) -> (Option<u8>, Option<u8>) {
    let body = &s[1..];
    match body.split_once('C') {
        Some((mode, channel)) => (mode.parse().ok(), channel.parse().ok()),
        None => (body.parse().ok(), None),
    }
}

/// Parse `YYYYJJJHHMMSSt`.
fn parse_scan_time(s: &str) -> Option<DateTime<Utc>> {
    if s.len() < 13 || !s.is_ascii() {
        return None;
    }
    let year: i32 = s.get(0..4)?.parse().ok()?;
    let doy: u32 = s.get(4..7)?.parse().ok()?;
    let hour: u32 = s.get(7..9)?.parse().ok()?;
    let minute: u32 = s.get(9..11)?.parse().ok()?;
    let second: u32 = s.get(11..13)?.parse().ok()?;
    let tenths: u32 = s.get(13..14).and_then(|t| t.parse().ok()).unwrap_or(0);

    let naive = NaiveDate::from_yo_opt(year, doy)?.and_hms_milli_opt(
        hour,
        minute,
        second,
        tenths * 100,
    )?;
    Some(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const NAME: &str =
        "OR_ABI-L2-CMIPF-M6C13_G19_s20251231200205_e20251231209513_c20251231209581.nc";

    #[test]
    fn test_parse_full_disk_cmi() {
        let info = GoesFileInfo::parse(NAME).unwrap();
        assert_eq!(info.product, "ABI-L2-CMIPF");
        assert_eq!(info.scene, GoesScene::FullDisk);
        assert_eq!(info.mode, Some(6));
        assert_eq!(info.channel, Some(13));
        assert_eq!(info.satellite, "G19");
        assert_eq!(info.scan_start.year(), 2025);
        assert_eq!(info.scan_start.ordinal(), 123);
        assert_eq!(info.scan_start.hour(), 12);
        assert_eq!(info.scan_start.second(), 20);
        assert!(info.scan_end.is_some());
    }

    #[test]
    fn test_parse_from_url() {
        let url = format!("https://noaa-goes19.s3.amazonaws.com/ABI-L2-CMIPF/2025/123/12/{}", NAME);
        assert_eq!(GoesFileInfo::parse(&url).unwrap().satellite, "G19");
    }

    #[test]
    fn test_parse_mesoscale_without_channel() {
        let info =
            GoesFileInfo::parse("OR_ABI-L2-ACMM1-M6_G16_s20240011200200_e20240011200257_c1.nc")
                .unwrap();
        assert_eq!(info.scene, GoesScene::Mesoscale1);
        assert_eq!(info.channel, None);
        assert_eq!(info.mode, Some(6));
    }

    #[test]
    fn test_parse_rejects_other_names() {
        assert!(GoesFileInfo::parse("scene.nc").is_err());
        assert!(GoesFileInfo::parse("OR_ABI-L2-CMIPF-M6C13_X19_s2025123120020").is_err());
    }

    #[test]
    fn test_title() {
        let info = GoesFileInfo::parse(NAME).unwrap();
        assert_eq!(info.title(), "G19 ABI-L2-CMIPF C13 2025-05-03 12:00 UTC");
    }
}
