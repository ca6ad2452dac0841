use crate::error::{NftrError, Result};

/// Ordered slot assignments, one `(index, character)` pair per glyph to replace.
///
/// The text form has one `INDEX CHAR` pair per line. Blank lines and lines starting
/// with `#` are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMapping {
    entries: Vec<(usize, char)>,
}

impl GlyphMapping {
    pub fn from_entries(entries: impl Into<Vec<(usize, char)>>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let error = |message: String| NftrError::Mapping {
                line: i + 1,
                message,
            };

            let mut fields = line.split_whitespace();
            let (Some(index), Some(character), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(error(format!("expected `INDEX CHAR`, got `{line}`")));
            };

            let index = index
                .parse::<usize>()
                .map_err(|e| error(format!("bad slot index `{index}`: {e}")))?;

            let mut chars = character.chars();
            let (Some(character), None) = (chars.next(), chars.next()) else {
                return Err(error(format!("`{character}` is not a single character")));
            };

            entries.push((index, character));
        }

        Ok(Self { entries })
    }

    /// Keeps the entries whose index lies in `start..=end`; a missing bound is open.
    pub fn filter_range(&self, start: Option<usize>, end: Option<usize>) -> Self {
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(usize::MAX);

        Self {
            entries: self
                .entries
                .iter()
                .copied()
                .filter(|(index, _)| (start..=end).contains(index))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(usize, char)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, char)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_index_char_lines() {
        let text = "# capitals\n32 А\n\n  33\tБ  \n65 а\n";
        let mapping = GlyphMapping::parse(text).unwrap();
        assert_eq!(&[(32, 'А'), (33, 'Б'), (65, 'а')], mapping.entries());
    }

    #[test]
    fn it_reports_the_offending_line() {
        let err = GlyphMapping::parse("32 А\nxx Б\n").unwrap_err();
        assert!(matches!(err, NftrError::Mapping { line: 2, .. }));

        let err = GlyphMapping::parse("32 АБ\n").unwrap_err();
        assert!(matches!(err, NftrError::Mapping { line: 1, .. }));

        let err = GlyphMapping::parse("\n\n32\n").unwrap_err();
        assert!(matches!(err, NftrError::Mapping { line: 3, .. }));
    }

    #[test]
    fn it_filters_an_inclusive_range() {
        let mapping = GlyphMapping::from_entries(vec![(32, 'А'), (33, 'Б'), (34, 'В'), (65, 'а')]);

        assert_eq!(
            &[(33, 'Б'), (34, 'В')],
            mapping.filter_range(Some(33), Some(34)).entries()
        );
        assert_eq!(
            &[(34, 'В'), (65, 'а')],
            mapping.filter_range(Some(34), None).entries()
        );
        assert_eq!(
            &[(32, 'А'), (33, 'Б')],
            mapping.filter_range(None, Some(33)).entries()
        );
        assert_eq!(mapping, mapping.filter_range(None, None));
    }
}
