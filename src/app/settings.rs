use crate::canvas::chunk_cache::DEFAULT_CHUNK_SIZE;
use crate::canvas::history::DEFAULT_HISTORY_DEPTH;
use crate::fill::gap_close::GapCloseParams;
use crate::fill::DEFAULT_FILL_PADDING;
use crate::selection::DEFAULT_SELECT_LIMIT;

/// Tunables shared by the editor's engines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineSettings {
    pub chunk_size: i32,
    pub fill_padding: i32,
    pub gap_close: GapCloseParams,
    pub select_limit: usize,
    pub history_depth: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            fill_padding: DEFAULT_FILL_PADDING,
            gap_close: GapCloseParams::default(),
            select_limit: DEFAULT_SELECT_LIMIT,
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

impl EngineSettings {
    /// Read overrides from command-line style arguments.
    ///
    /// Accepts `--flag N` and `--flag=N`. Unknown flags and unparsable values
    /// are skipped.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut settings = Self::default();
        let mut args = args.into_iter().map(|a| a.as_ref().to_string());
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            if !matches!(
                flag.as_str(),
                "--chunk-size" | "--fill-padding" | "--select-limit" | "--history-depth"
            ) {
                continue;
            }
            let Some(value) = inline.or_else(|| args.next()) else {
                break;
            };
            settings.apply(&flag, value.trim());
        }
        settings
    }

    fn apply(&mut self, flag: &str, value: &str) {
        let parsed = value.parse::<usize>().ok().filter(|v| *v > 0);
        let Some(v) = parsed else {
            log::warn!("ignoring {flag} {value:?}: expected a positive integer");
            return;
        };
        match flag {
            "--chunk-size" => self.chunk_size = v.min(4096) as i32,
            "--fill-padding" => self.fill_padding = v.min(1 << 16) as i32,
            "--select-limit" => self.select_limit = v,
            "--history-depth" => self.history_depth = v,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = EngineSettings::default();
        assert_eq!(s.chunk_size, 64);
        assert_eq!(s.fill_padding, 64);
        assert_eq!(s.select_limit, 50_000);
        assert_eq!(s.gap_close.rays, 32);
    }

    #[test]
    fn both_flag_forms_are_read() {
        let s = EngineSettings::from_args([
            "--chunk-size",
            "32",
            "--fill-padding=8",
            "--verbose",
            "--history-depth",
            "5",
        ]);
        assert_eq!(s.chunk_size, 32);
        assert_eq!(s.fill_padding, 8);
        assert_eq!(s.history_depth, 5);
        assert_eq!(s.select_limit, DEFAULT_SELECT_LIMIT);
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let s = EngineSettings::from_args(["--select-limit=lots", "--chunk-size", "0", "--fill-padding"]);
        assert_eq!(s, EngineSettings::default());
    }
}
