use school_admin_api::{NewStudent, StatusUpdate, Student, StudentStatus};
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};
use crate::html::escape_html;

const TABLE_COLUMNS: usize = 5;

/// Search box plus status dropdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterQuery {
    pub search: String,
    pub status: String,
}

impl RosterQuery {
    pub fn new(search: &str, status: &str) -> Self {
        Self {
            search: search.to_string(),
            status: status.to_string(),
        }
    }

    pub fn matches(&self, student: &Student) -> bool {
        let search = self.search.to_lowercase();
        let matches_search = search.is_empty()
            || student.student_name.to_lowercase().contains(&search)
            || student.student_id.to_lowercase().contains(&search);
        let matches_status = self.status.is_empty() || student.status.as_str() == self.status;
        matches_search && matches_status
    }
}

pub fn filter_students<'a>(students: &'a [Student], query: &RosterQuery) -> Vec<&'a Student> {
    students.iter().filter(|s| query.matches(s)).collect()
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Year column: only graduated or departed students have one
pub fn year_display(student: &Student) -> &str {
    match student.graduation_year.as_deref() {
        Some(year) if student.status.has_exit_year() && !year.is_empty() => year,
        _ => "-",
    }
}

pub fn status_badge(status: &StudentStatus) -> String {
    match status {
        StudentStatus::Active => r#"<span class="badge bg-success">Active</span>"#.to_string(),
        StudentStatus::Graduated => r#"<span class="badge bg-primary">Graduated</span>"#.to_string(),
        StudentStatus::Left => {
            r#"<span class="badge bg-warning text-dark">Left School</span>"#.to_string()
        }
        StudentStatus::Other(other) => format!(
            r#"<span class="badge bg-secondary">{}</span>"#,
            escape_html(or_na(other))
        ),
    }
}

/// Cells of one exported report row
pub fn report_row(student: &Student) -> [String; 4] {
    [
        or_na(&student.student_id).to_string(),
        or_na(&student.student_name).to_string(),
        or_na(student.status.as_str()).to_string(),
        year_display(student).to_string(),
    ]
}

pub fn table_rows_html(students: &[&Student]) -> String {
    if students.is_empty() {
        return message_row("text-muted", "No students found.");
    }

    students
        .iter()
        .map(|student| {
            format!(
                r#"<tr>
  <td>{sid}</td>
  <td>{name}</td>
  <td>{badge}</td>
  <td>{year}</td>
  <td>
    <button class="btn btn-sm btn-primary me-1 edit-student-btn" data-id="{id}"><i class="fas fa-edit"></i></button>
    <button class="btn btn-sm btn-danger delete-student-btn" data-id="{id}"><i class="fas fa-trash"></i></button>
  </td>
</tr>"#,
                sid = escape_html(or_na(&student.student_id)),
                name = escape_html(or_na(&student.student_name)),
                badge = status_badge(&student.status),
                year = escape_html(year_display(student)),
                id = student.id,
            )
        })
        .collect()
}

pub fn error_row_html(message: &str) -> String {
    message_row("text-danger", &format!("Error: {}", message))
}

fn message_row(class: &str, text: &str) -> String {
    format!(
        r#"<tr><td colspan="{}" class="text-center {}">{}</td></tr>"#,
        TABLE_COLUMNS,
        class,
        escape_html(text)
    )
}

/// Label and visibility of the graduation-year input for a status
pub fn graduation_year_label(status: &str) -> Option<&'static str> {
    match status {
        "Graduated" => Some("Graduation Year"),
        "Left" => Some("Year Left"),
        _ => None,
    }
}

/// Values read from the student modal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentForm {
    /// Row id while editing, empty when adding
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub status: String,
    pub graduation_year: String,
}

impl StudentForm {
    pub fn blank() -> Self {
        Self {
            status: StudentStatus::Active.as_str().to_string(),
            ..Default::default()
        }
    }

    pub fn from_student(student: &Student) -> Self {
        let status = match student.status.as_str() {
            "" => StudentStatus::Active.as_str().to_string(),
            other => other.to_string(),
        };
        let graduation_year = if student.status.has_exit_year() {
            student.graduation_year.clone().unwrap_or_default()
        } else {
            String::new()
        };

        Self {
            id: student.id.to_string(),
            student_id: student.student_id.clone(),
            student_name: student.student_name.clone(),
            status,
            graduation_year,
        }
    }

    pub fn is_edit(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Validate and turn the form into the backend call to make
    pub fn into_save(self) -> Result<SaveStudent> {
        let student_id = self.student_id.trim();
        let student_name = self.student_name.trim();
        if student_id.is_empty() || student_name.is_empty() {
            return Err(AdminError::validation("Student ID and Name are required"));
        }

        // Only graduated or departed students carry a year
        let graduation_year = if graduation_year_label(&self.status).is_some() {
            self.graduation_year.trim().to_string()
        } else {
            String::new()
        };

        if self.is_edit() {
            let id = self.id.trim().parse::<i64>().map_err(|_| AdminError::NotFound {
                kind: "student",
                id: self.id.clone(),
            })?;
            return Ok(SaveStudent::UpdateStatus {
                id,
                update: StatusUpdate {
                    status: self.status,
                    graduation_year,
                },
            });
        }

        Ok(SaveStudent::Add(NewStudent {
            student_id: student_id.to_string(),
            student_name: student_name.to_string(),
            status: self.status,
            graduation_year,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStudent {
    Add(NewStudent),
    UpdateStatus { id: i64, update: StatusUpdate },
}

impl SaveStudent {
    pub fn success_message(&self) -> &'static str {
        match self {
            SaveStudent::Add(_) => "Student added!",
            SaveStudent::UpdateStatus { .. } => "Student updated!",
        }
    }
}
