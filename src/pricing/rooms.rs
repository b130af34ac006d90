use bigdecimal::{BigDecimal, Zero};

use crate::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    /// `guests × 2` from `threshold` guests up, a flat daily rate below it
    Group { threshold: u32, daily: i64 },
    /// flat price per started six hour period
    Period,
    Hourly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomRate {
    pub key: &'static str,
    pub description: &'static str,
    pub hourly: i64,
    pub kind: RateKind,
    pub min_guests: u32,
    pub max_guests: u32,
}

impl RoomRate {
    pub fn clamp_guests(&self, guests: u32) -> u32 {
        guests.clamp(self.min_guests, self.max_guests)
    }

    pub fn admits(&self, guests: u32) -> bool {
        (self.min_guests..=self.max_guests).contains(&guests)
    }
}

const PER_GUEST: i64 = 2;
const PERIOD_PRICE: i64 = 5;
const PERIOD_MINUTES: u32 = 6 * 60;
const DAY_MINUTES: u32 = 24 * 60;

pub const ROOMS: [RoomRate; 6] = [
    RoomRate {
        key: "social",
        description: "Social Area",
        hourly: 3,
        kind: RateKind::Group { threshold: 15, daily: 3 },
        min_guests: 15,
        max_guests: 40,
    },
    RoomRate {
        key: "solo",
        description: "Solo Room",
        hourly: 5,
        kind: RateKind::Period,
        min_guests: 1,
        max_guests: 1,
    },
    RoomRate {
        key: "meeting-small",
        description: "Small Meeting Room",
        hourly: 8,
        kind: RateKind::Hourly,
        min_guests: 2,
        max_guests: 4,
    },
    RoomRate {
        key: "meeting-medium",
        description: "Medium Meeting Room",
        hourly: 12,
        kind: RateKind::Hourly,
        min_guests: 4,
        max_guests: 8,
    },
    RoomRate {
        key: "meeting-large",
        description: "Large Meeting Room",
        hourly: 18,
        kind: RateKind::Hourly,
        min_guests: 8,
        max_guests: 12,
    },
    RoomRate {
        key: "class",
        description: "Class Room",
        hourly: 3,
        kind: RateKind::Group { threshold: 7, daily: 3 },
        min_guests: 7,
        max_guests: 14,
    },
];

pub fn find(key: &str) -> Option<&'static RoomRate> {
    ROOMS.iter().find(|room| room.key == key)
}

/// Minutes since midnight for `HH:MM`.
pub fn parse_time(value: &str) -> Option<u32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Minutes between two `HH:MM` times. An end at or before the start is read
/// as the next day, so `22:00`..`02:00` is four hours and equal times are 24.
pub fn duration_minutes(start: &str, end: &str) -> Option<u32> {
    let start = parse_time(start)?;
    let mut end = parse_time(end)?;
    if end <= start {
        end += DAY_MINUTES;
    }
    Some(end - start)
}

/// `3h 30m`
pub fn format_duration(minutes: u32) -> String {
    match minutes % 60 {
        0 => format!("{}h", minutes / 60),
        rest => format!("{}h {}m", minutes / 60, rest),
    }
}

fn periods(duration_minutes: u32) -> u32 {
    (duration_minutes + PERIOD_MINUTES - 1) / PERIOD_MINUTES
}

fn hours(duration_minutes: u32) -> BigDecimal {
    BigDecimal::from(duration_minutes) / BigDecimal::from(60)
}

pub fn booking_cost(room: &str, duration_minutes: u32, guests: u32) -> BigDecimal {
    let room = match find(room) {
        Some(room) => room,
        None => return BigDecimal::zero(),
    };
    let cost = match room.kind {
        RateKind::Group { threshold, .. } if guests >= threshold => BigDecimal::from(guests) * BigDecimal::from(PER_GUEST),
        RateKind::Group { daily, .. } => BigDecimal::from(daily),
        RateKind::Period => BigDecimal::from(periods(duration_minutes)) * BigDecimal::from(PERIOD_PRICE),
        RateKind::Hourly => hours(duration_minutes) * BigDecimal::from(room.hourly),
    };
    money::round(&cost)
}

pub fn rate_description(room: &str, duration_minutes: u32, guests: u32) -> String {
    let room = match find(room) {
        Some(room) => room,
        None => return String::new(),
    };
    match room.kind {
        RateKind::Group { threshold, .. } if guests >= threshold => format!("{guests} guests × {PER_GUEST} JOD"),
        RateKind::Group { daily, .. } => format!("{daily} JOD / 24h"),
        RateKind::Period => {
            let periods = periods(duration_minutes);
            let plural = if periods > 1 { "s" } else { "" };
            format!("{periods} period{plural} × {PERIOD_PRICE} JOD/6h")
        }
        RateKind::Hourly => {
            let hours = f64::from(duration_minutes) / 60.0;
            format!("{}h × {} JOD/h", (hours * 100.0).round() / 100.0, room.hourly)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::cents;

    #[test]
    fn test_duration_wraps_overnight() {
        assert_eq!(duration_minutes("09:00", "17:00"), Some(480));
        assert_eq!(duration_minutes("22:00", "02:00"), Some(240));
        assert_eq!(duration_minutes("10:00", "10:00"), Some(1440));
        assert_eq!(duration_minutes("10:15", "11:45"), Some(90));
        assert_eq!(duration_minutes("25:00", "11:00"), None);
        assert_eq!(duration_minutes("ten", "11:00"), None);
        assert_eq!(format_duration(90), "1h 30m");
        assert_eq!(format_duration(120), "2h");
    }

    #[test]
    fn test_solo_is_priced_per_started_period() {
        for minutes in [30, 60, 359, 360, 361, 480, 720, 1440] {
            let expected = BigDecimal::from(((minutes + 359) / 360) * 5);
            assert_eq!(booking_cost("solo", minutes, 1), expected, "minutes: {minutes}");
        }
        assert_eq!(booking_cost("solo", 8 * 60, 1), BigDecimal::from(10));
        assert_eq!(rate_description("solo", 8 * 60, 1), "2 periods × 5 JOD/6h");
        assert_eq!(rate_description("solo", 60, 1), "1 period × 5 JOD/6h");
    }

    #[test]
    fn test_group_rooms() {
        for guests in 1..15 {
            assert_eq!(booking_cost("social", 600, guests), BigDecimal::from(3));
        }
        for guests in 15..=40 {
            assert_eq!(booking_cost("social", 600, guests), BigDecimal::from(2 * guests));
        }
        assert_eq!(booking_cost("class", 60, 6), BigDecimal::from(3));
        assert_eq!(booking_cost("class", 60, 7), BigDecimal::from(14));
        assert_eq!(rate_description("social", 60, 15), "15 guests × 2 JOD");
        assert_eq!(rate_description("class", 60, 3), "3 JOD / 24h");
    }

    #[test]
    fn test_meeting_rooms_are_hourly() {
        assert_eq!(booking_cost("meeting-small", 180, 3), BigDecimal::from(24));
        assert_eq!(booking_cost("meeting-medium", 90, 5), BigDecimal::from(18));
        assert_eq!(booking_cost("meeting-large", 20, 8), BigDecimal::from(6));
        assert_eq!(booking_cost("meeting-small", 50, 2), cents(667));
        assert_eq!(rate_description("meeting-small", 180, 3), "3h × 8 JOD/h");
        assert_eq!(rate_description("meeting-small", 90, 3), "1.5h × 8 JOD/h");
    }

    #[test]
    fn test_unknown_room_costs_nothing() {
        assert!(booking_cost("rooftop", 120, 4).is_zero());
        assert_eq!(rate_description("rooftop", 120, 4), "");
    }

    #[test]
    fn test_capacity() {
        let room = find("meeting-small").unwrap();
        assert!(room.admits(2));
        assert!(room.admits(4));
        assert!(!room.admits(5));
        assert_eq!(room.clamp_guests(9), 4);
        assert_eq!(room.clamp_guests(0), 2);
    }

    #[test]
    fn test_costs_are_stable() {
        for room in ROOMS {
            assert_eq!(booking_cost(room.key, 200, 9), booking_cost(room.key, 200, 9));
        }
    }
}
