use serde::Deserialize;

/// A single scan report, as listed by the server.
///
/// The sequence returned by the list operation is kept in document order; that order is also
/// the index basis for operator selections.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ReportDescriptor {
    /// The server-assigned identifier, used in download query strings.
    pub name: String,

    /// The human readable name, used for local file names.
    #[serde(rename = "readableName")]
    pub readable_name: String,

    /// The processing status, for display only.
    pub status: String,

    /// Completion time, seconds since the epoch. Kept opaque, it only ever ends up in a
    /// file name.
    #[serde(default)]
    pub timestamp: String,
}

/// The reply of the report list operation.
#[derive(Clone, Debug, Deserialize)]
pub struct ReportListReply {
    pub contents: ReportListContents,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReportListContents {
    pub reports: ReportList,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReportList {
    #[serde(default, rename = "report")]
    pub report: Vec<ReportDescriptor>,
}

impl ReportListReply {
    /// Extract the reports, in document order.
    pub fn into_reports(self) -> Vec<ReportDescriptor> {
        self.contents.reports.report
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_list_reply() {
        let reply: ReportListReply = quick_xml::de::from_str(
            r#"<reply>
  <seq>6969</seq>
  <status>OK</status>
  <contents>
    <reports>
      <report>
        <name>ab8d3772-0001</name>
        <readableName>Internal Scan</readableName>
        <status>completed</status>
        <timestamp>1394647199</timestamp>
      </report>
      <report>
        <name>ab8d3772-0002</name>
        <readableName>DMZ/North</readableName>
        <status>running</status>
        <timestamp>1394650000</timestamp>
      </report>
    </reports>
  </contents>
</reply>"#,
        )
        .expect("must parse");

        let reports = reply.into_reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(
            reports[0],
            ReportDescriptor {
                name: "ab8d3772-0001".into(),
                readable_name: "Internal Scan".into(),
                status: "completed".into(),
                timestamp: "1394647199".into(),
            }
        );
        assert_eq!(reports[1].readable_name, "DMZ/North");
    }

    #[test]
    fn parse_empty_list_reply() {
        let reply: ReportListReply = quick_xml::de::from_str(
            r#"<reply><contents><reports/></contents></reply>"#,
        )
        .expect("must parse");

        assert!(reply.into_reports().is_empty());
    }

    #[test]
    fn parse_missing_timestamp() {
        let reply: ReportListReply = quick_xml::de::from_str(
            r#"<reply><contents><reports><report>
<name>x</name><readableName>y</readableName><status>completed</status>
</report></reports></contents></reply>"#,
        )
        .expect("must parse");

        assert_eq!(reply.into_reports()[0].timestamp, "");
    }
}
