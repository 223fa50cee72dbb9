use crate::error::InjectError;
use crate::models::DelimiterPair;
use crate::services::fs::FileSystem;
use camino::Utf8Path;
use regex::bytes::Regex;

/// Fixed notice written on its own line after the start marker.
///
/// The trailing space is part of the notice; files produced by the JavaScript plugin carry it
/// too.
pub const AUTOGENERATED_NOTICE: &str = "/*Content between those comments is autogenerated.*/ ";

/// Replaces the delimited region of a style module with freshly compiled CSS.
///
/// The region pattern is `<start>(?s-u:.*)<end>` with both markers escaped. The wildcard is
/// greedy, so a file with several marker pairs collapses from the first start marker to the
/// last end marker into one region. Every replacement re-emits both markers, which keeps the
/// region discoverable for the next pass.
#[derive(Debug, Clone)]
pub struct InjectionEngine {
    delimiters: DelimiterPair,
    region_pattern: Regex,
}

impl InjectionEngine {
    pub fn new(delimiters: DelimiterPair) -> Result<Self, InjectError> {
        let pattern = format!(
            "{}(?s-u:.*){}",
            regex::escape(&delimiters.start),
            regex::escape(&delimiters.end)
        );

        let region_pattern = Regex::new(&pattern).map_err(|source| InjectError::InvalidPattern {
            option: "start_comment/end_comment",
            source,
        })?;

        Ok(Self {
            delimiters,
            region_pattern,
        })
    }

    pub fn delimiters(&self) -> &DelimiterPair {
        &self.delimiters
    }

    /// The text that replaces a matched region: markers, notice and payload.
    pub fn region_block(&self, payload: &str) -> String {
        format!(
            "{}\n{}\n{}{}",
            self.delimiters.start, AUTOGENERATED_NOTICE, payload, self.delimiters.end
        )
    }

    pub fn has_region(&self, content: &[u8]) -> bool {
        !content.is_empty() && self.region_pattern.is_match(content)
    }

    /// Splice `payload` into `content`. Returns `None` when there is no region.
    ///
    /// Bytes outside the matched region are copied unchanged; the payload is inserted
    /// literally.
    pub fn replace_region(&self, content: &[u8], payload: &str) -> Option<Vec<u8>> {
        if content.is_empty() {
            return None;
        }

        let region = self.region_pattern.find(content)?;
        let block = self.region_block(payload);

        let mut updated = Vec::with_capacity(content.len() - region.len() + block.len());
        updated.extend_from_slice(&content[..region.start()]);
        updated.extend_from_slice(block.as_bytes());
        updated.extend_from_slice(&content[region.end()..]);
        Some(updated)
    }

    /// Read `target`, replace its region with `payload` and write it back in place.
    ///
    /// # Errors
    /// - `NoPayload` if `payload` is absent or empty; the file is not touched at all
    /// - `ReadFailed` if the target can't be read
    /// - `RegionNotFound` if the target is empty or lacks a start/end marker pair
    /// - `WriteFailed` if the updated content can't be written
    pub fn inject(
        &self,
        fs: &dyn FileSystem,
        target: &Utf8Path,
        payload: Option<&str>,
    ) -> Result<(), InjectError> {
        let payload = match payload {
            Some(css) if !css.is_empty() => css,
            _ => return Err(InjectError::NoPayload(target.to_path_buf())),
        };

        let content = fs.read(target).map_err(|source| InjectError::ReadFailed {
            path: target.to_path_buf(),
            source,
        })?;

        let updated = self
            .replace_region(&content, payload)
            .ok_or_else(|| InjectError::RegionNotFound(target.to_path_buf()))?;

        fs.write(target, &updated)
            .map_err(|source| InjectError::WriteFailed {
                path: target.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            "Replaced region in {} ({} -> {} bytes)",
            target,
            content.len(),
            updated.len()
        );

        Ok(())
    }
}
