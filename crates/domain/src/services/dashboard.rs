//! Aggregates the admin dashboard from the raw collections.

use chrono::NaiveDate;

use crate::models::campaign::{Campaign, CampaignStatus};
use crate::models::dashboard::{CampaignTotals, DashboardSummary, PaymentTotals};
use crate::models::event::Event;
use crate::models::expense::Expense;
use crate::models::notice::Notice;
use crate::models::payment::{PaymentStatus, PaymentTransaction};

/// Number of payments listed under "recent payments".
pub const RECENT_PAYMENTS: usize = 5;

/// Collections the dashboard is computed from.
#[derive(Debug, Clone, Copy)]
pub struct DashboardInput<'a> {
    pub campaigns: &'a [Campaign],
    pub payments: &'a [PaymentTransaction],
    pub expenses: &'a [Expense],
    pub notices: &'a [Notice],
    pub events: &'a [Event],
    pub today: NaiveDate,
}

pub fn summarize(input: DashboardInput<'_>) -> DashboardSummary {
    let campaigns = campaign_totals(input.campaigns);
    let payments = payment_totals(input.payments);

    let expense_amount: f64 = input.expenses.iter().map(|e| e.amount).sum();

    let mut recent: Vec<PaymentTransaction> = input.payments.to_vec();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(RECENT_PAYMENTS);

    DashboardSummary {
        net_balance: payments.donated_amount - expense_amount,
        campaigns,
        payments,
        expense_count: input.expenses.len(),
        expense_amount,
        active_notices: input.notices.iter().filter(|n| n.active).count(),
        upcoming_events: input
            .events
            .iter()
            .filter(|e| e.is_upcoming(input.today))
            .count(),
        recent_payments: recent,
    }
}

fn campaign_totals(campaigns: &[Campaign]) -> CampaignTotals {
    let mut totals = CampaignTotals {
        total: campaigns.len(),
        ..Default::default()
    };
    for status in CampaignStatus::ALL {
        totals.by_status.insert(status.as_str().to_string(), 0);
    }
    for campaign in campaigns {
        *totals
            .by_status
            .entry(campaign.status.as_str().to_string())
            .or_default() += 1;
        totals.goal_amount += campaign.goal_amount;
        totals.raised_amount += campaign.raised_amount;
    }
    totals
}

fn payment_totals(payments: &[PaymentTransaction]) -> PaymentTotals {
    let mut totals = PaymentTotals {
        count: payments.len(),
        ..Default::default()
    };
    for status in PaymentStatus::ALL {
        totals.by_status.insert(status.as_str().to_string(), 0);
    }
    for payment in payments {
        *totals
            .by_status
            .entry(payment.status.as_str().to_string())
            .or_default() += 1;

        if payment.status.counts_as_donation() {
            totals.donated_amount += payment.amount;
            *totals
                .monthly
                .entry(payment.date.format("%Y-%m").to_string())
                .or_default() += payment.amount;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn payment(id: &str, amount: f64, status: PaymentStatus, month: u32, day: u32) -> PaymentTransaction {
        let date = Utc.with_ymd_and_hms(2024, month, day, 10, 0, 0).unwrap();
        PaymentTransaction {
            id: id.to_string(),
            user_id: "uid-1".to_string(),
            user_name: "Donor".to_string(),
            campaign_id: None,
            amount,
            method: "bkash".to_string(),
            status,
            date,
            created_at: date,
            updated_at: date,
        }
    }

    fn expense(amount: f64) -> Expense {
        Expense {
            id: "e".to_string(),
            name: "Rice".to_string(),
            amount,
            details: String::new(),
            attachment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn campaign(status: CampaignStatus, goal: f64, raised: f64) -> Campaign {
        Campaign {
            id: "c".to_string(),
            title: "Flood relief".to_string(),
            description: String::new(),
            goal_amount: goal,
            raised_amount: raised,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            status,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn input<'a>(
        campaigns: &'a [Campaign],
        payments: &'a [PaymentTransaction],
        expenses: &'a [Expense],
    ) -> DashboardInput<'a> {
        DashboardInput {
            campaigns,
            payments,
            expenses,
            notices: &[],
            events: &[],
            today: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_only_succeeded_payments_are_donations() {
        let payments = vec![
            payment("p1", 100.0, PaymentStatus::Succeeded, 1, 5),
            payment("p2", 50.0, PaymentStatus::Pending, 1, 6),
            payment("p3", 25.0, PaymentStatus::Succeeded, 2, 1),
            payment("p4", 10.0, PaymentStatus::Refunded, 2, 2),
        ];
        let expenses = vec![expense(30.0)];
        let summary = summarize(input(&[], &payments, &expenses));

        assert_eq!(summary.payments.count, 4);
        assert_eq!(summary.payments.donated_amount, 125.0);
        assert_eq!(summary.payments.by_status["Pending"], 1);
        assert_eq!(summary.payments.by_status["Failed"], 0);
        assert_eq!(summary.payments.monthly["2024-01"], 100.0);
        assert_eq!(summary.payments.monthly["2024-02"], 25.0);
        assert_eq!(summary.net_balance, 95.0);
    }

    #[test]
    fn test_recent_payments_newest_first() {
        let payments: Vec<_> = (1..=7)
            .map(|d| payment(&format!("p{}", d), 1.0, PaymentStatus::Succeeded, 3, d))
            .collect();
        let summary = summarize(input(&[], &payments, &[]));

        let ids: Vec<_> = summary.recent_payments.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p7", "p6", "p5", "p4", "p3"]);
    }

    #[test]
    fn test_campaign_totals() {
        let campaigns = vec![
            campaign(CampaignStatus::Active, 1000.0, 400.0),
            campaign(CampaignStatus::Active, 500.0, 500.0),
            campaign(CampaignStatus::Draft, 200.0, 0.0),
        ];
        let summary = summarize(input(&campaigns, &[], &[]));

        assert_eq!(summary.campaigns.total, 3);
        assert_eq!(summary.campaigns.by_status["active"], 2);
        assert_eq!(summary.campaigns.by_status["completed"], 0);
        assert_eq!(summary.campaigns.goal_amount, 1700.0);
        assert_eq!(summary.campaigns.raised_amount, 900.0);
    }

    #[test]
    fn test_empty_dashboard() {
        let summary = summarize(input(&[], &[], &[]));
        assert_eq!(summary.net_balance, 0.0);
        assert!(summary.recent_payments.is_empty());
        assert!(summary.payments.monthly.is_empty());
    }
}
