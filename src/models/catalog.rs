use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Static program -> year -> semester -> course reference tree. Loaded once at
/// startup and shared read-only; mutation happens only through seed tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub programs: Vec<Program>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub years: Vec<Year>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Year {
    pub year: i32,
    pub semesters: Vec<Semester>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    pub semester: i32,
    pub courses: Vec<Course>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

/// A course together with its denormalized position in the tree.
#[derive(Debug, Clone)]
pub struct CourseRef<'a> {
    pub course: &'a Course,
    pub program: &'a Program,
    pub year: i32,
    pub semester: i32,
}

const DEFAULT_CATALOG: &str = include_str!("../../data/catalog.json");

impl Catalog {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        Ok(catalog)
    }

    /// Loads the catalog from `path` when set, otherwise from the embedded
    /// default document.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("Cannot read catalog file {}: {}", p, e))
                })?;
                Self::from_json_str(&raw)
            }
            None => Self::from_json_str(DEFAULT_CATALOG),
        }
    }

    pub fn find_course(&self, course_id: &str) -> Option<CourseRef<'_>> {
        self.all_courses()
            .into_iter()
            .find(|c| c.course.id == course_id)
    }

    /// All courses in catalog-encounter order.
    pub fn all_courses(&self) -> Vec<CourseRef<'_>> {
        let mut out = Vec::new();
        for program in &self.programs {
            for year in &program.years {
                for semester in &year.semesters {
                    for course in &semester.courses {
                        out.push(CourseRef {
                            course,
                            program,
                            year: year.year,
                            semester: semester.semester,
                        });
                    }
                }
            }
        }
        out
    }

    /// Filters by program id, year, and semester. The sentinel "all" (or an
    /// unparseable year/semester) leaves that dimension unfiltered.
    pub fn courses_filtered(
        &self,
        program: &str,
        year: &str,
        semester: &str,
    ) -> Vec<CourseRef<'_>> {
        let year_filter: Option<i32> = if year.eq_ignore_ascii_case("all") {
            None
        } else {
            year.trim().parse().ok()
        };
        let semester_filter: Option<i32> = if semester.eq_ignore_ascii_case("all") {
            None
        } else {
            semester.trim().parse().ok()
        };

        self.all_courses()
            .into_iter()
            .filter(|c| program.eq_ignore_ascii_case("all") || c.program.id == program)
            .filter(|c| year_filter.map_or(true, |y| c.year == y))
            .filter(|c| semester_filter.map_or(true, |s| c.semester == s))
            .collect()
    }
}
