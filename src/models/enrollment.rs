//! Enrollment records and group size hints.
//!
//! Enrollment records come from the student information system ("Studis")
//! and link a student to a subject within a group-set, together with the
//! study programme, class year and enrollment type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Studis enrollment type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrollmentType(pub u16);

impl EnrollmentType {
    /// First enrollment into the class year.
    pub const FIRST_TIME: Self = Self(4);
    /// Parallel enrollment.
    pub const PARALLEL: Self = Self(41);
    /// Repeating the class year.
    pub const REPEATING: Self = Self(5);
    /// Students of other faculties of the university.
    pub const OTHER_FACULTY: Self = Self(25);
    /// Students of a joint programme led by another faculty.
    pub const JOINT_PROGRAMME: Self = Self(26);

    /// Description of the code as published by the enrollment system.
    pub fn description(self) -> Option<&'static str> {
        let text = match self.0 {
            4 => "Prvi vpis v letnik",
            41 => "Vzporedni vpis",
            42 => "Prvi vpis diplomanta",
            43 => "Prepis",
            44 => "Dodatno leto (absolvent)",
            5 => "Ponavljanje letnika",
            7 => "Podaljšanje statusa po končanem dodatnem letu",
            21 => "Izjemno podaljšanje statusa",
            1 => "Vpis po merilih za prehode",
            45 => "Vpis v semester skupnega študijskega programa",
            47 => "Vpis po merilih za prehode v isti letnik",
            51 => "Prvi vpis v program - v višji letnik na podlagi priznanih obveznosti",
            46 => "Vpis za zaključek",
            3 => "Občan",
            23 => "Pavzer",
            25 => "Študentje drugih fakultet UL",
            26 => "Študentje skupnega programa kjer fakulteta ni nosilec",
            27 => "Študentje drugih univerz",
            28 => "Polaganje izpitov izven študijskega programa",
            48 => "Študentje drugih univerz brez poročanja EVŠ",
            49 => "Pavzerji skupnih študijskih programov",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for EnrollmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Renders an enrollment type restriction for method labels:
/// `[4, 41]`, or `all types` when unrestricted.
pub fn describe_types(types: Option<&[EnrollmentType]>) -> String {
    match types {
        None => "all types".to_string(),
        Some(types) => {
            let codes: Vec<String> = types.iter().map(ToString::to_string).collect();
            format!("[{}]", codes.join(", "))
        }
    }
}

/// One student's enrollment into one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEnrollment {
    pub student: String,
    pub groupset: String,
    pub subject: String,
    /// Study programme short name.
    pub study: Option<String>,
    pub classyear: u32,
    pub enrollment_type: EnrollmentType,
}

impl StudentEnrollment {
    /// Creates an enrollment of `student` into `subject`.
    pub fn new(
        student: impl Into<String>,
        groupset: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            student: student.into(),
            groupset: groupset.into(),
            subject: subject.into(),
            study: None,
            classyear: 0,
            enrollment_type: EnrollmentType::FIRST_TIME,
        }
    }

    /// Sets study programme and class year.
    pub fn with_cohort(mut self, study: impl Into<String>, classyear: u32) -> Self {
        self.study = Some(study.into());
        self.classyear = classyear;
        self
    }

    /// Sets the enrollment type.
    pub fn with_type(mut self, enrollment_type: EnrollmentType) -> Self {
        self.enrollment_type = enrollment_type;
        self
    }
}

/// Filter applied to enrollment queries.
///
/// `None` fields are unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub groupset: String,
    pub students: Option<Vec<String>>,
    pub subjects: Option<Vec<String>>,
    pub study: Option<String>,
    pub classyear: Option<u32>,
    pub types: Option<Vec<EnrollmentType>>,
}

impl EnrollmentFilter {
    /// Filter on a group-set.
    pub fn groupset(groupset: impl Into<String>) -> Self {
        Self {
            groupset: groupset.into(),
            ..Self::default()
        }
    }

    /// Whether an enrollment passes the filter.
    pub fn matches(&self, e: &StudentEnrollment) -> bool {
        e.groupset == self.groupset
            && self.students.as_ref().is_none_or(|s| s.contains(&e.student))
            && self.subjects.as_ref().is_none_or(|s| s.contains(&e.subject))
            && self
                .study
                .as_ref()
                .is_none_or(|s| e.study.as_deref() == Some(s.as_str()))
            && self.classyear.is_none_or(|y| e.classyear == y)
            && self
                .types
                .as_ref()
                .is_none_or(|t| t.contains(&e.enrollment_type))
    }
}

/// An estimated headcount for a group, labelled by the estimation method.
///
/// At most one live hint exists per (group, method).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSizeHint {
    pub group: String,
    pub method: String,
    pub size: u32,
}

impl GroupSizeHint {
    pub fn new(group: impl Into<String>, method: impl Into<String>, size: u32) -> Self {
        Self {
            group: group.into(),
            method: method.into(),
            size,
        }
    }
}

impl fmt::Display for GroupSizeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.method, self.group, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_types() {
        assert_eq!(describe_types(None), "all types");
        assert_eq!(
            describe_types(Some(&[EnrollmentType::FIRST_TIME, EnrollmentType::PARALLEL])),
            "[4, 41]"
        );
    }

    #[test]
    fn test_type_description() {
        assert_eq!(EnrollmentType::PARALLEL.description(), Some("Vzporedni vpis"));
        assert_eq!(EnrollmentType(999).description(), None);
    }

    #[test]
    fn test_filter_matches() {
        let e = StudentEnrollment::new("s1", "2024", "63277")
            .with_cohort("BUN-RI", 1)
            .with_type(EnrollmentType::FIRST_TIME);

        let mut filter = EnrollmentFilter::groupset("2024");
        assert!(filter.matches(&e));

        filter.subjects = Some(vec!["63277".into()]);
        filter.study = Some("BUN-RI".into());
        filter.classyear = Some(1);
        assert!(filter.matches(&e));

        filter.types = Some(vec![EnrollmentType::PARALLEL]);
        assert!(!filter.matches(&e));

        let other_set = EnrollmentFilter::groupset("2023");
        assert!(!other_set.matches(&e));
    }

    #[test]
    fn test_filter_study_requires_enrollment_study() {
        let e = StudentEnrollment::new("s1", "2024", "63277");
        let filter = EnrollmentFilter {
            study: Some("BUN-RI".into()),
            ..EnrollmentFilter::groupset("2024")
        };
        assert!(!filter.matches(&e));
    }
}
