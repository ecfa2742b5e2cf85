use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{info, instrument};

use crate::entities::{
    farm, financial, Crop, Farm, FinancialRecord, InventoryItem, Task, WeatherForecast,
};
use crate::errors::ServiceError;
use crate::repositories::Repository;

const UPCOMING_TASKS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub farm_count: usize,
    pub total_acres: f64,
    pub active_crops: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
    pub inventory_items: usize,
    pub low_stock_items: usize,
    pub inventory_value: f64,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_income: f64,
    pub upcoming_tasks: Vec<Task>,
    pub today_weather: Option<WeatherForecast>,
}

/// Everything the dashboard reads, fetched together
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub farms: Vec<Farm>,
    pub crops: Vec<Crop>,
    pub tasks: Vec<Task>,
    pub finances: Vec<FinancialRecord>,
    pub weather: Vec<WeatherForecast>,
    pub inventory: Vec<InventoryItem>,
}

impl DashboardData {
    pub fn summarize(self, today: NaiveDate) -> DashboardSummary {
        let totals = financial::totals(&self.finances);

        let mut upcoming: Vec<Task> = self.tasks.iter().filter(|t| !t.completed).cloned().collect();
        // Undated tasks sort last.
        upcoming.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        upcoming.truncate(UPCOMING_TASKS);

        DashboardSummary {
            farm_count: self.farms.len(),
            total_acres: farm::total_acres(&self.farms),
            active_crops: self.crops.iter().filter(|c| c.is_active()).count(),
            pending_tasks: self.tasks.iter().filter(|t| !t.completed).count(),
            overdue_tasks: self.tasks.iter().filter(|t| t.is_overdue(today)).count(),
            inventory_items: self.inventory.len(),
            low_stock_items: self.inventory.iter().filter(|i| i.is_low_stock()).count(),
            inventory_value: self.inventory.iter().map(InventoryItem::total_value).sum(),
            total_income: totals.total_income,
            total_expenses: totals.total_expenses,
            net_income: totals.net_income,
            upcoming_tasks: upcoming,
            today_weather: self.weather.into_iter().next(),
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    farms: Repository<Farm>,
    crops: Repository<Crop>,
    tasks: Repository<Task>,
    finances: Repository<FinancialRecord>,
    weather: Repository<WeatherForecast>,
    inventory: Repository<InventoryItem>,
}

impl DashboardService {
    pub fn new(
        farms: Repository<Farm>,
        crops: Repository<Crop>,
        tasks: Repository<Task>,
        finances: Repository<FinancialRecord>,
        weather: Repository<WeatherForecast>,
        inventory: Repository<InventoryItem>,
    ) -> Self {
        Self {
            farms,
            crops,
            tasks,
            finances,
            weather,
            inventory,
        }
    }

    /// Issues all six list reads at once; the first failure fails the whole load.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<DashboardData, ServiceError> {
        let (farms, crops, tasks, finances, weather, inventory) = tokio::try_join!(
            self.farms.list(),
            self.crops.list(),
            self.tasks.list(),
            self.finances.list(),
            self.weather.list(),
            self.inventory.list(),
        )?;

        info!(
            farms = farms.len(),
            crops = crops.len(),
            tasks = tasks.len(),
            inventory = inventory.len(),
            "dashboard data loaded"
        );

        Ok(DashboardData {
            farms,
            crops,
            tasks,
            finances,
            weather,
            inventory,
        })
    }

    pub async fn summary_for(&self, today: NaiveDate) -> Result<DashboardSummary, ServiceError> {
        Ok(self.load().await?.summarize(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farm(id: i64, acres: f64) -> Farm {
        Farm {
            id,
            name: format!("Farm {}", id),
            location: String::new(),
            size_acres: acres,
            farm_type: String::new(),
            notes: String::new(),
            soil_type: String::new(),
            gps_coordinates: String::new(),
            current_crop: String::new(),
            irrigation_type: String::new(),
            past_crops: String::new(),
            fertility_level: String::new(),
        }
    }

    fn task(id: i64, due: Option<NaiveDate>, completed: bool) -> Task {
        Task {
            id,
            title: format!("Task {}", id),
            description: String::new(),
            due_date: due,
            priority: "medium".into(),
            category: "general".into(),
            completed,
            crop_id: None,
        }
    }

    #[test]
    fn summary_sums_acres_and_orders_upcoming_tasks() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let data = DashboardData {
            farms: vec![farm(1, 10.0), farm(2, 20.5)],
            tasks: vec![
                task(1, None, false),
                task(2, NaiveDate::from_ymd_opt(2024, 6, 12), false),
                task(3, NaiveDate::from_ymd_opt(2024, 6, 1), false),
                task(4, NaiveDate::from_ymd_opt(2024, 6, 2), true),
            ],
            ..Default::default()
        };

        let summary = data.summarize(today);
        assert_eq!(summary.farm_count, 2);
        assert_eq!(summary.total_acres, 30.5);
        assert_eq!(summary.pending_tasks, 3);
        assert_eq!(summary.overdue_tasks, 1);
        let order: Vec<i64> = summary.upcoming_tasks.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![3, 2, 1]);
        assert!(summary.today_weather.is_none());
    }
}
