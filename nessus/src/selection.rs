//! Operator selections
//!
//! The three inputs collected before a download run: which reports, which file formats, and,
//! for rendered output, which chapters to include. Inputs are comma separated code lists, or
//! the word `all`. Unrecognized format and chapter codes are silently skipped, matching the
//! behavior of the management interface's own client.

use crate::discover::DiscoveredArtifact;
use crate::model::report::ReportDescriptor;
use std::fmt::{self, Display, Formatter};
use url::Url;

/// Error building a selection
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("empty selection")]
    Empty,
    #[error("invalid report index: {0}")]
    InvalidIndex(String),
    #[error("report index out of range: {0}")]
    OutOfRange(usize),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// A file format a report can be downloaded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// The native `.nessus` (v2) format.
    Nessus,
    Html,
    Pdf,
    Csv,
    Nbe,
}

impl Format {
    /// All formats, in the order the `all` selection expands to.
    pub const ALL: [Format; 5] = [
        Format::Nessus,
        Format::Html,
        Format::Pdf,
        Format::Csv,
        Format::Nbe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nessus => "nessus",
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::Nbe => "nbe",
        }
    }

    /// Whether the rendered output includes a chapter selection.
    pub fn has_chapters(&self) -> bool {
        matches!(self, Self::Html | Self::Pdf)
    }

    /// Whether the final artifact sits behind an additional `step=2` request.
    pub fn has_second_step(&self) -> bool {
        matches!(self, Self::Pdf | Self::Csv | Self::Nbe)
    }

    /// The request path for downloading one report in this format.
    pub fn download_path(&self, report: &str, chapters: &ChapterSelection) -> String {
        match self {
            Self::Csv | Self::Nbe => {
                format!("/file/xslt/?report={report}&xslt={}.xsl", self.as_str())
            }
            Self::Nessus => format!("/file/report/download/?report={report}"),
            Self::Html | Self::Pdf => format!(
                "/chapter?report={report}&format={}&chapters={}",
                self.as_str(),
                chapters.as_str()
            ),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chapter of the rendered (HTML/PDF) report output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chapter {
    VulnHostsSummary,
    VulnByPlugin,
    VulnByHost,
    Remediations,
    ComplianceExec,
    Compliance,
}

impl Chapter {
    /// All chapters, in the order the `all` selection expands to.
    pub const ALL: [Chapter; 6] = [
        Chapter::VulnHostsSummary,
        Chapter::VulnByPlugin,
        Chapter::VulnByHost,
        Chapter::Remediations,
        Chapter::ComplianceExec,
        Chapter::Compliance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VulnHostsSummary => "vuln_hosts_summary",
            Self::VulnByPlugin => "vuln_by_plugin",
            Self::VulnByHost => "vuln_by_host",
            Self::Remediations => "remediations",
            Self::ComplianceExec => "compliance_exec",
            Self::Compliance => "compliance",
        }
    }
}

/// The reports to download: everything, or a list of indices into the listed sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportSelection {
    All,
    Indices(Vec<usize>),
}

impl ReportSelection {
    /// Parse a comma separated list of indices, or `all`.
    ///
    /// Only the raw input being empty is an error here; indices are validated against the
    /// report sequence in [`ReportSelection::indices`].
    pub fn parse(input: &str) -> Result<Self, SelectionError> {
        if input.is_empty() {
            return Err(SelectionError::Empty);
        }

        let tokens = input.split(',').map(str::trim);

        if tokens.clone().next() == Some("all") {
            return Ok(Self::All);
        }

        Ok(Self::Indices(
            tokens
                .map(|token| {
                    token
                        .parse::<usize>()
                        .map_err(|_| SelectionError::InvalidIndex(token.to_string()))
                })
                .collect::<Result<_, _>>()?,
        ))
    }

    /// Resolve into concrete indices against a sequence of `count` reports.
    pub fn indices(&self, count: usize) -> Result<Vec<usize>, SelectionError> {
        match self {
            Self::All => Ok((0..count).collect()),
            Self::Indices(indices) => {
                for index in indices {
                    if *index >= count {
                        return Err(SelectionError::OutOfRange(*index));
                    }
                }
                Ok(indices.clone())
            }
        }
    }
}

/// The file formats to download, in selection order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormatSelection(Vec<Format>);

impl FormatSelection {
    /// Parse a comma separated list of format codes (`0`..`4`), or `all`.
    ///
    /// Unrecognized codes contribute nothing, duplicates are kept.
    pub fn parse(input: &str) -> Result<Self, SelectionError> {
        if input.is_empty() {
            return Err(SelectionError::Empty);
        }

        let mut formats = Vec::new();
        for code in input.split(',').map(str::trim) {
            match code {
                "all" => formats.extend(Format::ALL),
                "0" => formats.push(Format::Nessus),
                "1" => formats.push(Format::Html),
                "2" => formats.push(Format::Pdf),
                "3" => formats.push(Format::Csv),
                "4" => formats.push(Format::Nbe),
                _ => {}
            }
        }

        Ok(Self(formats))
    }

    pub fn formats(&self) -> &[Format] {
        &self.0
    }

    /// Whether any selected format renders with chapters (HTML or PDF).
    pub fn needs_chapters(&self) -> bool {
        self.0.iter().any(Format::has_chapters)
    }
}

/// The chapters to include in rendered output, serialized as semicolon terminated tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChapterSelection(String);

impl ChapterSelection {
    /// Parse a comma separated list of chapter codes (`0`..`5`), or `all`.
    ///
    /// Unrecognized codes contribute nothing.
    pub fn parse(input: &str) -> Result<Self, SelectionError> {
        if input.is_empty() {
            return Err(SelectionError::Empty);
        }

        let mut chapters = String::new();
        for code in input.split(',').map(str::trim) {
            let selected: &[Chapter] = match code {
                "all" => &Chapter::ALL,
                "0" => &[Chapter::VulnByPlugin],
                "1" => &[Chapter::VulnByHost],
                "2" => &[Chapter::VulnHostsSummary],
                "3" => &[Chapter::Remediations],
                "4" => &[Chapter::ComplianceExec],
                "5" => &[Chapter::Compliance],
                _ => &[],
            };
            for chapter in selected {
                chapters.push_str(chapter.as_str());
                chapters.push(';');
            }
        }

        Ok(Self(chapters))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The full operator selection for one download run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub reports: ReportSelection,
    pub formats: FormatSelection,
    pub chapters: ChapterSelection,
}

impl Selection {
    /// Parse the three raw inputs. The chapter input is only consulted when a selected format
    /// renders with chapters.
    pub fn parse(reports: &str, formats: &str, chapters: &str) -> Result<Self, SelectionError> {
        let reports = ReportSelection::parse(reports)?;
        let formats = FormatSelection::parse(formats)?;
        let chapters = match formats.needs_chapters() {
            true => ChapterSelection::parse(chapters)?,
            false => ChapterSelection::default(),
        };

        Ok(Self {
            reports,
            formats,
            chapters,
        })
    }

    /// Expand the selection against the listed reports into the ordered sequence of download
    /// artifacts: reports outer, formats inner, both in selection order.
    pub fn artifacts(
        &self,
        reports: &[ReportDescriptor],
        base: &Url,
    ) -> Result<Vec<DiscoveredArtifact>, SelectionError> {
        let mut artifacts = Vec::new();

        for index in self.reports.indices(reports.len())? {
            let report = &reports[index];
            for format in self.formats.formats() {
                let url = base.join(&format.download_path(&report.name, &self.chapters))?;
                artifacts.push(DiscoveredArtifact {
                    report: report.clone(),
                    format: *format,
                    url,
                });
            }
        }

        Ok(artifacts)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn report(name: &str, readable_name: &str) -> ReportDescriptor {
        ReportDescriptor {
            name: name.into(),
            readable_name: readable_name.into(),
            status: "completed".into(),
            timestamp: "1394647199".into(),
        }
    }

    #[test]
    fn reports_all() {
        let selection = ReportSelection::parse("all").expect("must parse");
        assert_eq!(selection.indices(3).expect("in range"), vec![0, 1, 2]);
    }

    #[test]
    fn reports_indices() {
        let selection = ReportSelection::parse("2,0").expect("must parse");
        assert_eq!(selection.indices(3).expect("in range"), vec![2, 0]);
    }

    #[test]
    fn reports_out_of_range() {
        let selection = ReportSelection::parse("3").expect("must parse");
        assert!(matches!(
            selection.indices(3),
            Err(SelectionError::OutOfRange(3))
        ));
    }

    #[test]
    fn reports_invalid() {
        assert!(matches!(
            ReportSelection::parse("1,x"),
            Err(SelectionError::InvalidIndex(_))
        ));
    }

    #[test]
    fn reports_empty() {
        assert!(matches!(
            ReportSelection::parse(""),
            Err(SelectionError::Empty)
        ));
    }

    #[test]
    fn formats_all() {
        let selection = FormatSelection::parse("all").expect("must parse");
        assert_eq!(selection.formats(), Format::ALL);
    }

    #[test]
    fn formats_in_selection_order() {
        let selection = FormatSelection::parse("2,1").expect("must parse");
        assert_eq!(selection.formats(), [Format::Pdf, Format::Html]);
    }

    #[test]
    fn formats_skip_unrecognized() {
        let selection = FormatSelection::parse("9,x,0").expect("must parse");
        assert_eq!(selection.formats(), [Format::Nessus]);
    }

    #[test]
    fn formats_only_unrecognized_is_not_an_error() {
        // the raw input is non-empty, post-filter emptiness is accepted
        let selection = FormatSelection::parse("9").expect("must parse");
        assert!(selection.formats().is_empty());
    }

    #[test]
    fn chapters_all() {
        let selection = ChapterSelection::parse("all").expect("must parse");
        assert_eq!(
            selection.as_str(),
            "vuln_hosts_summary;vuln_by_plugin;vuln_by_host;remediations;compliance_exec;compliance;"
        );
    }

    #[test]
    fn chapters_single() {
        let selection = ChapterSelection::parse("0").expect("must parse");
        assert_eq!(selection.as_str(), "vuln_by_plugin;");
    }

    #[test]
    fn chapters_appended_in_input_order() {
        let selection = ChapterSelection::parse("3,1").expect("must parse");
        assert_eq!(selection.as_str(), "remediations;vuln_by_host;");
    }

    #[test]
    fn download_paths() {
        let chapters = ChapterSelection::parse("all").expect("must parse");

        assert_eq!(
            Format::Csv.download_path("id-1", &chapters),
            "/file/xslt/?report=id-1&xslt=csv.xsl"
        );
        assert_eq!(
            Format::Nbe.download_path("id-1", &chapters),
            "/file/xslt/?report=id-1&xslt=nbe.xsl"
        );
        assert_eq!(
            Format::Nessus.download_path("id-1", &chapters),
            "/file/report/download/?report=id-1"
        );
        assert_eq!(
            Format::Pdf.download_path("id-1", &chapters),
            "/chapter?report=id-1&format=pdf&chapters=vuln_hosts_summary;vuln_by_plugin;vuln_by_host;remediations;compliance_exec;compliance;"
        );
    }

    #[test]
    fn chapters_skipped_without_rendered_format() {
        let selection = Selection::parse("all", "0,3", "").expect("must parse");
        assert_eq!(selection.chapters, ChapterSelection::default());
    }

    #[test]
    fn chapters_required_for_rendered_format() {
        assert!(matches!(
            Selection::parse("all", "1", ""),
            Err(SelectionError::Empty)
        ));
    }

    #[test]
    fn artifacts_reports_outer_formats_inner() {
        let base = Url::parse("https://scanner.example.com:8834/").expect("valid URL");
        let reports = vec![report("id-1", "First"), report("id-2", "Second")];

        let selection = Selection::parse("all", "0,3", "").expect("must parse");
        let artifacts = selection.artifacts(&reports, &base).expect("must expand");

        let summary = artifacts
            .iter()
            .map(|artifact| (artifact.report.name.as_str(), artifact.format))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("id-1", Format::Nessus),
                ("id-1", Format::Csv),
                ("id-2", Format::Nessus),
                ("id-2", Format::Csv),
            ]
        );
        assert_eq!(
            artifacts[1].url.as_str(),
            "https://scanner.example.com:8834/file/xslt/?report=id-1&xslt=csv.xsl"
        );
    }
}
