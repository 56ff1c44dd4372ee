use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{activity::Activity, family_member::FamilyMember, trip::Trip};

/// Aggregated view of the family's preference fields, for planning around
/// shared constraints instead of reading each member one by one.
#[derive(Debug, Serialize)]
pub struct FamilyPreferences {
    pub total_members: usize,
    pub age_groups: AgeGroups,
    pub dietary_restrictions: Vec<String>,
    pub mobility_needs: Vec<String>,
    pub common_interests: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct AgeGroups {
    pub children: usize,
    pub adults: usize,
    pub seniors: usize,
}

fn split_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
}

pub fn aggregate_family_preferences(members: &[FamilyMember]) -> FamilyPreferences {
    let mut age_groups = AgeGroups::default();
    let mut dietary_restrictions = Vec::new();
    let mut mobility_needs = Vec::new();
    let mut interest_counts: HashMap<String, usize> = HashMap::new();

    for member in members {
        match member.age {
            Some(age) if age < 18 => age_groups.children += 1,
            Some(age) if age < 65 => age_groups.adults += 1,
            Some(_) => age_groups.seniors += 1,
            None => {}
        }
        if let Some(raw) = &member.dietary_restrictions {
            dietary_restrictions.extend(split_list(raw));
        }
        if let Some(raw) = &member.mobility_needs {
            mobility_needs.extend(split_list(raw));
        }
        if let Some(raw) = &member.interests {
            for interest in split_list(raw) {
                *interest_counts.entry(interest).or_default() += 1;
            }
        }
    }

    dietary_restrictions.sort();
    dietary_restrictions.dedup();
    mobility_needs.sort();
    mobility_needs.dedup();

    // An interest is "common" once more than one member names it.
    let mut common_interests: Vec<String> = interest_counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(interest, _)| interest)
        .collect();
    common_interests.sort();

    FamilyPreferences {
        total_members: members.len(),
        age_groups,
        dietary_restrictions,
        mobility_needs,
        common_interests,
    }
}

/// One day of the trip with its scheduled activities and their cost.
#[derive(Debug, Serialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub activities: Vec<Activity>,
    pub total_estimated_cost: f64,
}

/// Group a trip's activities into one entry per trip day, in date order.
/// Days without activities still appear; activities without a scheduled
/// date (or scheduled outside the trip window) are left out.
pub fn group_daily_activities(trip: &Trip, activities: &[Activity]) -> Vec<DailyPlan> {
    let mut by_date: HashMap<NaiveDate, Vec<Activity>> = HashMap::new();
    for activity in activities {
        if let Some(date) = activity.scheduled_date {
            by_date.entry(date).or_default().push(activity.clone());
        }
    }

    let mut plans = Vec::new();
    let mut date = trip.start_date;
    while date <= trip.end_date {
        let mut day_activities = by_date.remove(&date).unwrap_or_default();
        day_activities.sort_by(|a, b| a.name.cmp(&b.name));
        let total_estimated_cost = day_activities.iter().map(|a| a.estimated_cost).sum();
        plans.push(DailyPlan {
            date,
            activities: day_activities,
            total_estimated_cost,
        });
        let Some(next) = date.succ_opt() else { break };
        date = next;
    }
    plans
}
