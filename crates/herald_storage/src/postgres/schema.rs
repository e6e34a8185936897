//! Diesel table definitions.

diesel::table! {
    guild_configs (guild_id) {
        guild_id -> Int8,
        document -> Jsonb,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    guild_stats (guild_id) {
        guild_id -> Int8,
        joins_today -> Int8,
        joins_week -> Int8,
        joins_month -> Int8,
        joins_total -> Int8,
        leaves_today -> Int8,
        leaves_week -> Int8,
        leaves_month -> Int8,
        leaves_total -> Int8,
        last_update -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    guild_stats_history (id) {
        id -> Int8,
        guild_id -> Int8,
        kind -> Text,
        user_id -> Int8,
        recorded_at -> Timestamptz,
    }
}

diesel::joinable!(guild_stats_history -> guild_stats (guild_id));

diesel::allow_tables_to_appear_in_same_query!(guild_configs, guild_stats, guild_stats_history);
