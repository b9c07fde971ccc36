//! Job number allocation and job code formatting.
//!
//! Every job, whatever its department, draws its number from the one shared
//! counter. The job code (`jobLes`) is the department prefix followed by the
//! number zero-padded to six digits, e.g. `LEH000001`.

use db::models::{
    department::Department,
    job::{AllocatedJobCode, CreateJob},
    job_counter::JobCounter,
};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum JobNumberError {
    #[error("job counter unavailable: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Prefix + six-digit zero-padded number. Unknown, empty or missing
/// departments get the general `LEG` prefix. Numbers past 999999 are printed
/// in full rather than truncated.
pub fn format_job_code(number: i64, department: Option<&str>) -> String {
    let prefix = Department::from_tag(department).prefix();
    format!("{prefix}{number:06}")
}

/// The department tag stored on a new job. An explicit department is kept
/// as given; otherwise it is derived from the job type, else `GENERAL`.
pub fn resolve_department(data: &CreateJob) -> String {
    if let Some(department) = data.department.as_deref().filter(|d| !d.trim().is_empty()) {
        return department.to_string();
    }
    data.job_type
        .as_deref()
        .map(Department::from_job_type)
        .unwrap_or_default()
        .to_string()
}

#[derive(Clone)]
pub struct JobNumberAllocator {
    pool: SqlitePool,
}

impl JobNumberAllocator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Draw the next number on its own. The increment is committed
    /// immediately; use [`JobNumberAllocator::allocate`] when the number is
    /// for a job being inserted.
    pub async fn next_job_number(&self) -> Result<i64, JobNumberError> {
        Ok(JobCounter::next_job_number(&self.pool).await?)
    }

    /// Draw a number on `conn` (normally an open transaction) and format the
    /// job code for `department`. Rolling the transaction back returns the
    /// number to the counter.
    pub async fn allocate(
        conn: &mut SqliteConnection,
        department: &str,
    ) -> Result<AllocatedJobCode, JobNumberError> {
        let job_number = JobCounter::next_job_number(&mut *conn).await?;
        let job_les = format_job_code(job_number, Some(department));
        debug!(job_number, job_les = %job_les, "Allocated job number");
        Ok(AllocatedJobCode {
            job_number,
            job_les,
            department: department.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use db::DBService;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_format_job_code_known_departments() {
        assert_eq!(format_job_code(1, Some("HIRE")), "LEH000001");
        assert_eq!(format_job_code(999999, Some("SALES")), "LES999999");
        assert_eq!(format_job_code(42, Some("hire")), "LEH000042");
        assert_eq!(format_job_code(3, Some("Transport")), "LEX000003");
        assert_eq!(format_job_code(12, Some("ADMIN")), "LEA000012");
    }

    #[test]
    fn test_format_job_code_falls_back_to_general() {
        assert_eq!(format_job_code(7, Some("UNKNOWN_DEPT")), "LEG000007");
        assert_eq!(format_job_code(7, Some("")), "LEG000007");
        assert_eq!(format_job_code(7, None), "LEG000007");
        assert_eq!(format_job_code(7, Some("GENERAL")), "LEG000007");
        // Exact match only, no trimming.
        assert_eq!(format_job_code(7, Some(" HIRE")), "LEG000007");
    }

    #[test]
    fn test_format_job_code_is_nine_characters() {
        let samples = [1, 2, 9, 10, 99, 100, 12_345, 500_000, 999_998, 999_999];
        for department in Department::iter() {
            let tag = department.to_string();
            for number in samples {
                assert_eq!(format_job_code(number, Some(&tag)).len(), 9, "{tag} {number}");
            }
        }
        for number in 1..=2_000 {
            assert_eq!(format_job_code(number, None).len(), 9);
        }
    }

    #[test]
    fn test_format_job_code_does_not_truncate_large_numbers() {
        assert_eq!(format_job_code(1_000_000, Some("HIRE")), "LEH1000000");
    }

    #[test]
    fn test_resolve_department() {
        let explicit = CreateJob {
            department: Some("sales".to_string()),
            job_type: Some("Hire".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_department(&explicit), "sales");

        let from_type = CreateJob {
            job_type: Some("Fabrication".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_department(&from_type), "FABRICATION");

        let blank = CreateJob {
            department: Some("  ".to_string()),
            job_type: Some("Painting".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_department(&blank), "GENERAL");

        assert_eq!(resolve_department(&CreateJob::default()), "GENERAL");
    }

    #[tokio::test]
    async fn test_first_number_is_one() {
        let db = DBService::new_in_memory().await.unwrap();
        let allocator = JobNumberAllocator::new(db.pool.clone());
        assert_eq!(allocator.next_job_number().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sequential_numbers_continue_from_current_value() {
        let db = DBService::new_in_memory().await.unwrap();
        let allocator = JobNumberAllocator::new(db.pool.clone());
        for _ in 0..3 {
            allocator.next_job_number().await.unwrap();
        }

        let k = JobCounter::current(&db.pool).await.unwrap();
        let mut drawn = Vec::new();
        for _ in 0..10 {
            drawn.push(allocator.next_job_number().await.unwrap());
        }
        assert_eq!(drawn, ((k + 1)..=(k + 10)).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_allocate_rolls_back_with_transaction() {
        let db = DBService::new_in_memory().await.unwrap();

        let mut tx = db.pool.begin().await.unwrap();
        let code = JobNumberAllocator::allocate(&mut tx, "HIRE").await.unwrap();
        assert_eq!(code.job_number, 1);
        assert_eq!(code.job_les, "LEH000001");
        assert_eq!(code.department, "HIRE");
        tx.rollback().await.unwrap();

        let mut tx = db.pool.begin().await.unwrap();
        let code = JobNumberAllocator::allocate(&mut tx, "testing").await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(code.job_les, "LET000001");
        assert_eq!(JobCounter::current(&db.pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("jobs.db").display());
        let db = DBService::new(&url, 5).await.unwrap();
        let allocator = JobNumberAllocator::new(db.pool.clone());

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move { allocator.next_job_number().await })
            })
            .collect();

        let mut numbers = HashSet::new();
        for handle in futures::future::join_all(handles).await {
            let number = handle.unwrap().unwrap();
            assert!(numbers.insert(number), "number {number} issued twice");
        }
        assert_eq!(numbers.len(), 25);
        assert_eq!(numbers.iter().max(), Some(&25));
    }
}
