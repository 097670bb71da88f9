use super::BindValue;
use rust_decimal::Decimal;

// Each helper appends one bind value and returns its 1-based placeholder index.

pub(super) fn push_int(bind_params: &mut Vec<BindValue>, value: i32) -> usize {
    bind_params.push(BindValue::Int(value));
    bind_params.len()
}

pub(super) fn push_bigint(bind_params: &mut Vec<BindValue>, value: i64) -> usize {
    bind_params.push(BindValue::BigInt(value));
    bind_params.len()
}

pub(super) fn push_int_array(bind_params: &mut Vec<BindValue>, value: Vec<i32>) -> usize {
    bind_params.push(BindValue::IntArray(value));
    bind_params.len()
}

pub(super) fn push_decimal(bind_params: &mut Vec<BindValue>, value: Decimal) -> usize {
    bind_params.push(BindValue::Decimal(value));
    bind_params.len()
}

pub(super) fn push_text(bind_params: &mut Vec<BindValue>, value: String) -> usize {
    bind_params.push(BindValue::Text(value));
    bind_params.len()
}
