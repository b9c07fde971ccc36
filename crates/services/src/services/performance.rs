//! Figures behind the performance dashboard.

use std::{cmp::Ordering, collections::BTreeMap};

use db::models::{client::Client, job::Job};
use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

const UNKNOWN_DEPARTMENT: &str = "UNKNOWN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub count: usize,
    pub revenue: f64,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ClientValue {
    pub client_id: Uuid,
    pub name: String,
    pub value: f64,
    pub job_count: usize,
    /// Percentage of this client's jobs marked complete.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub total_jobs: usize,
    pub total_clients: usize,
    pub total_revenue: f64,
    /// Percentage of all jobs marked complete.
    pub completion_rate: f64,
    pub avg_job_value: f64,
    pub status_counts: BTreeMap<String, usize>,
    pub department_stats: BTreeMap<String, DepartmentStats>,
    /// Highest value first.
    pub client_value: Vec<ClientValue>,
}

pub struct PerformanceService;

impl PerformanceService {
    pub fn summary(jobs: &[Job], clients: &[Client]) -> PerformanceSummary {
        let total_revenue: f64 = jobs.iter().map(job_value).sum();
        let completed = jobs.iter().filter(|job| job.job_complete).count();

        let mut status_counts = BTreeMap::new();
        let mut department_stats: BTreeMap<String, DepartmentStats> = BTreeMap::new();
        for job in jobs {
            *status_counts.entry(job.job_status.clone()).or_insert(0) += 1;

            let department = job
                .department
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(UNKNOWN_DEPARTMENT);
            let stats = department_stats.entry(department.to_string()).or_default();
            stats.count += 1;
            stats.revenue += job_value(job);
            if job.job_complete {
                stats.completed += 1;
            }
        }

        let mut client_value: Vec<ClientValue> = clients
            .iter()
            .map(|client| {
                let client_jobs: Vec<&Job> = jobs
                    .iter()
                    .filter(|job| job.client_id == Some(client.id))
                    .collect();
                let done = client_jobs.iter().filter(|job| job.job_complete).count();
                ClientValue {
                    client_id: client.id,
                    name: client.company_name.clone(),
                    value: client_jobs.iter().map(|job| job_value(job)).sum(),
                    job_count: client_jobs.len(),
                    completion_rate: percentage(done, client_jobs.len()),
                }
            })
            .collect();
        client_value.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

        PerformanceSummary {
            total_jobs: jobs.len(),
            total_clients: clients.len(),
            total_revenue,
            completion_rate: percentage(completed, jobs.len()),
            avg_job_value: if jobs.is_empty() {
                0.0
            } else {
                total_revenue / jobs.len() as f64
            },
            status_counts,
            department_stats,
            client_value,
        }
    }
}

/// Unparseable amounts count as zero.
fn job_value(job: &Job) -> f64 {
    job.cost_nett.trim().parse::<f64>().unwrap_or(0.0)
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use db::{
        DBService,
        models::{client::CreateClient, job::CreateJob},
    };

    use super::*;
    use crate::services::storage::{DbStorage, Storage};

    fn job(
        client_id: Option<Uuid>,
        department: Option<&str>,
        cost: &str,
        complete: bool,
        status: &str,
    ) -> CreateJob {
        CreateJob {
            client_id,
            department: department.map(str::to_string),
            cost_nett: Some(cost.to_string()),
            job_complete: Some(complete),
            job_status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_inputs() {
        let summary = PerformanceService::summary(&[], &[]);
        assert_eq!(summary, PerformanceSummary::default());
    }

    #[tokio::test]
    async fn test_summary_figures() {
        let storage = DbStorage::new(DBService::new_in_memory().await.unwrap());
        let acme = storage
            .create_client(&CreateClient {
                company_name: "Acme".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let bolt = storage
            .create_client(&CreateClient {
                company_name: "Bolt".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        for data in [
            job(Some(acme.id), Some("HIRE"), "100.00", true, "CLOSED"),
            job(Some(acme.id), Some("HIRE"), "50.00", false, "OPEN"),
            job(Some(bolt.id), Some("SALES"), "400.00", true, "CLOSED"),
            job(None, None, "50.00", false, "OPEN"),
        ] {
            storage.create_job(&data).await.unwrap();
        }
        let mut jobs = storage.list_jobs(&Default::default()).await.unwrap();
        // Rows from before departments were recorded.
        jobs[3].department = None;
        let clients = storage.list_clients().await.unwrap();
        let summary = PerformanceService::summary(&jobs, &clients);

        assert_eq!(summary.total_jobs, 4);
        assert_eq!(summary.total_clients, 2);
        assert_eq!(summary.total_revenue, 600.0);
        assert_eq!(summary.completion_rate, 50.0);
        assert_eq!(summary.avg_job_value, 150.0);
        assert_eq!(summary.status_counts.get("OPEN"), Some(&2));
        assert_eq!(summary.status_counts.get("CLOSED"), Some(&2));

        let hire = &summary.department_stats["HIRE"];
        assert_eq!((hire.count, hire.revenue, hire.completed), (2, 150.0, 1));
        assert_eq!(summary.department_stats[UNKNOWN_DEPARTMENT].count, 1);
        assert!(!summary.department_stats.contains_key("GENERAL"));

        let names: Vec<_> = summary.client_value.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bolt", "Acme"]);
        assert_eq!(summary.client_value[1].job_count, 2);
        assert_eq!(summary.client_value[1].completion_rate, 50.0);
    }
}
