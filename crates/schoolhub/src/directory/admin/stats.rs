use serde::Serialize;

use crate::directory::domain::{Board, SchoolRecord, SchoolType};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_schools: usize,
    pub total_users: usize,
    pub total_ratings: usize,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub school_type: SchoolType,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardCount {
    pub board: Board,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    #[serde(flatten)]
    pub dashboard: DashboardStats,
    pub schools_by_type: Vec<TypeCount>,
    pub schools_by_board: Vec<BoardCount>,
}

impl DashboardStats {
    pub fn new(total_schools: usize, total_users: usize, rating_scores: &[f64]) -> Self {
        Self {
            total_schools,
            total_users,
            total_ratings: rating_scores.len(),
            average_rating: average_rating(rating_scores),
        }
    }
}

impl AnalyticsReport {
    pub fn new(dashboard: DashboardStats, schools: &[SchoolRecord]) -> Self {
        let schools_by_type = count_in_order(schools, |school| school.school_type)
            .into_iter()
            .map(|(school_type, count)| TypeCount { school_type, count })
            .collect();
        let schools_by_board = count_in_order(schools, |school| school.board)
            .into_iter()
            .map(|(board, count)| BoardCount { board, count })
            .collect();

        Self {
            dashboard,
            schools_by_type,
            schools_by_board,
        }
    }
}

/// Mean score rounded to one decimal place; 0 when there are no reviews.
pub fn average_rating(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean * 10.0).round() / 10.0
}

fn count_in_order<K, F>(schools: &[SchoolRecord], key: F) -> Vec<(K, usize)>
where
    K: PartialEq + Copy,
    F: Fn(&SchoolRecord) -> K,
{
    let mut counts: Vec<(K, usize)> = Vec::new();
    for school in schools {
        let value = key(school);
        match counts.iter_mut().find(|(existing, _)| *existing == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}
