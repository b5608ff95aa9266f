use chrono::NaiveDateTime;
use school_admin_api::Student;
use serde::Serialize;

use crate::config::SchoolInfo;
use crate::error::{AdminError, Result};
use crate::roster::report_row;

pub const REPORT_TITLE: &str = "STUDENT GENERAL LIST";
pub const REPORT_HEAD: [&str; 4] = ["Student ID", "Name", "Status", "Year"];
/// Header row fill, RGB
pub const HEAD_FILL: [u8; 3] = [6, 95, 70];

/// Everything the PDF renderer needs, computed up front
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterReport {
    pub title: &'static str,
    pub school_name: String,
    pub sub_name: String,
    pub address: String,
    /// Already prefixed lines, empty fields dropped
    pub contact_lines: Vec<String>,
    pub logo_src: String,
    pub head: [&'static str; 4],
    pub body: Vec<[String; 4]>,
    pub head_fill: [u8; 3],
    pub footer: String,
    pub file_name: String,
}

impl RosterReport {
    pub fn build(students: &[&Student], school: &SchoolInfo, now: NaiveDateTime) -> Result<Self> {
        if students.is_empty() {
            return Err(AdminError::validation("No students to export."));
        }

        let mut contact_lines = Vec::new();
        if !school.phone.is_empty() {
            contact_lines.push(format!("Phone: {}", school.phone));
        }
        if !school.email.is_empty() {
            contact_lines.push(format!("Email: {}", school.email));
        }

        Ok(Self {
            title: REPORT_TITLE,
            school_name: school.name.clone(),
            sub_name: school.sub_name.clone(),
            address: school.address.clone(),
            contact_lines,
            logo_src: school.logo_src.clone(),
            head: REPORT_HEAD,
            body: students.iter().map(|s| report_row(s)).collect(),
            head_fill: HEAD_FILL,
            footer: format!(
                "Generated on {} at {}",
                now.format("%d/%m/%Y"),
                now.format("%H:%M:%S")
            ),
            file_name: format!("student_general_list_{}.pdf", now.format("%Y-%m-%d")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use school_admin_api::StudentStatus;

    fn create_test_student(id: i64, status: StudentStatus, year: Option<&str>) -> Student {
        Student {
            id,
            student_id: format!("STU-{:03}", id),
            student_name: format!("Student {}", id),
            status,
            graduation_year: year.map(str::to_string),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 9)
            .unwrap()
            .and_hms_opt(14, 5, 3)
            .unwrap()
    }

    #[test]
    fn test_build_report() {
        let students = vec![
            create_test_student(1, StudentStatus::Active, None),
            create_test_student(2, StudentStatus::Graduated, Some("2024")),
        ];
        let refs: Vec<&Student> = students.iter().collect();

        let report = RosterReport::build(&refs, &SchoolInfo::default(), now()).unwrap();
        assert_eq!(report.title, "STUDENT GENERAL LIST");
        assert_eq!(report.body.len(), 2);
        assert_eq!(report.body[1][3], "2024");
        assert_eq!(report.body[0][3], "-");
        assert_eq!(report.footer, "Generated on 09/01/2025 at 14:05:03");
        assert_eq!(report.file_name, "student_general_list_2025-01-09.pdf");
        assert_eq!(
            report.contact_lines,
            vec!["Phone: 08033459721, 09062171496", "Email: info@ibadurrahman.edu.ng"]
        );
    }

    #[test]
    fn test_empty_contact_fields_are_dropped() {
        let students = vec![create_test_student(1, StudentStatus::Active, None)];
        let refs: Vec<&Student> = students.iter().collect();
        let school = SchoolInfo {
            phone: String::new(),
            ..SchoolInfo::default()
        };

        let report = RosterReport::build(&refs, &school, now()).unwrap();
        assert_eq!(report.contact_lines, vec!["Email: info@ibadurrahman.edu.ng"]);
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let err = RosterReport::build(&[], &SchoolInfo::default(), now()).unwrap_err();
        assert_eq!(err.to_string(), "No students to export.");
    }
}
