//! Interactive prompts
//!
//! Every value the original interactive flow asks for can also be passed as a flag; these
//! helpers only run for values that are still missing.

use nessus_walker::model::report::ReportDescriptor;
use std::io::{self, Write};

pub fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

/// Prompt without echoing the input.
pub fn prompt_password(label: &str) -> io::Result<String> {
    rpassword::prompt_password(label)
}

/// Show the listed reports and ask which ones to download.
pub fn prompt_reports(reports: &[ReportDescriptor]) -> io::Result<String> {
    println!();
    println!("Number of reports found: {}", reports.len());
    for (index, report) in reports.iter().enumerate() {
        println!(
            "[{index}] Name: {} | GUID: {} | Status: {}",
            report.readable_name, report.name, report.status
        );
    }

    prompt("Enter the report(s) you want to download (comma separated list) or 'all': ")
}

pub fn prompt_formats() -> io::Result<String> {
    println!();
    println!("Choose file type(s) to download:");
    println!("[0] .nessus - v2 (no chapter selection)");
    println!("[1] HTML");
    println!("[2] PDF");
    println!("[3] CSV (no chapter selection)");
    println!("[4] NBE (no chapter selection)");

    prompt("Enter the file type(s) you want to download (comma separated list) or 'all': ")
}

pub fn prompt_chapters() -> io::Result<String> {
    println!();
    println!("Choose chapter(s) to include:");
    println!("[0] Vulnerabilities By Plugin");
    println!("[1] Vulnerabilities By Host");
    println!("[2] Hosts Summary (Executive)");
    println!("[3] Suggested Remediations");
    println!("[4] Compliance Check (Executive)");
    println!("[5] Compliance Check");

    prompt("Enter the chapter(s) you want to include (comma separated list) or 'all': ")
}
