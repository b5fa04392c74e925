use crate::models::activity::Activity;

/// Sums `pixels × multiplier` across the activities the member holds a
/// positive multiplier in. Members without an entry contribute nothing.
pub fn accumulate(member_id: &str, activities: &[Activity]) -> i64 {
    activities
        .iter()
        .map(|activity| activity.pixels * activity.multiplier_for(member_id))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::ActivityType;
    use crate::tests::mock::mock_activity;

    #[test]
    fn multiplier_scales_the_base_value() {
        let coffee = mock_activity("coffee", ActivityType::CoffeeChat, 5, &[("alice", 3)]);

        assert_eq!(accumulate("alice", &[coffee]), 15);
    }

    #[test]
    fn members_without_an_entry_earn_nothing() {
        let coffee = mock_activity("coffee", ActivityType::CoffeeChat, 5, &[("alice", 3)]);

        assert_eq!(accumulate("carol", &[coffee]), 0);
    }

    #[test]
    fn contributions_add_up_across_activities() {
        let activities = vec![
            mock_activity("coffee", ActivityType::CoffeeChat, 5, &[("alice", 3)]),
            mock_activity("bonding", ActivityType::Bonding, 2, &[("alice", 4), ("bob", 1)]),
        ];

        assert_eq!(accumulate("alice", &activities), 23);
        assert_eq!(accumulate("bob", &activities), 2);
    }
}
