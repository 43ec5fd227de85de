const ENTITIES_RETRIEVED_METRIC_NAME: &str = "amon_entities_retrieved";
const ENTITIES_CREATED_METRIC_NAME: &str = "amon_entities_created";
const ENTITIES_UPDATED_METRIC_NAME: &str = "amon_entities_updated";
const ENTITIES_DELETED_METRIC_NAME: &str = "amon_entities_deleted";

const METERING_POINTS_RETRIEVED_METRIC_NAME: &str = "amon_metering_points_retrieved";
const METERING_POINTS_CREATED_METRIC_NAME: &str = "amon_metering_points_created";
const METERING_POINTS_UPDATED_METRIC_NAME: &str = "amon_metering_points_updated";

#[inline]
pub fn increment_entities_retrieved() {
    increment_entities_retrieved_by(1);
}

#[inline]
pub fn increment_entities_retrieved_by(amt: usize) {
    metrics::counter!(ENTITIES_RETRIEVED_METRIC_NAME).increment(amt as u64);
}

#[inline]
pub fn increment_entities_created() {
    metrics::counter!(ENTITIES_CREATED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_entities_updated() {
    metrics::counter!(ENTITIES_UPDATED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_entities_deleted() {
    metrics::counter!(ENTITIES_DELETED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_metering_points_retrieved() {
    increment_metering_points_retrieved_by(1);
}

#[inline]
pub fn increment_metering_points_retrieved_by(amt: usize) {
    metrics::counter!(METERING_POINTS_RETRIEVED_METRIC_NAME).increment(amt as u64);
}

#[inline]
pub fn increment_metering_points_created() {
    metrics::counter!(METERING_POINTS_CREATED_METRIC_NAME).increment(1);
}

#[inline]
pub fn increment_metering_points_updated() {
    metrics::counter!(METERING_POINTS_UPDATED_METRIC_NAME).increment(1);
}
