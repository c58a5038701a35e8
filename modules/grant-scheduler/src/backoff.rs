/// Exponential retry delay, capped (spec §4.8): `base * multiplier^(attempts-1)`,
/// clamped to `max_delay_ms`. `attempts` is 1-based (first failure == 1).
pub fn retry_delay_ms(attempts: u32, base_delay_ms: u64, multiplier: u32, max_delay_ms: u64) -> u64 {
    if attempts == 0 {
        return base_delay_ms.min(max_delay_ms);
    }
    let exponent = attempts - 1;
    let multiplier_pow = (multiplier as u64).saturating_pow(exponent);
    base_delay_ms.saturating_mul(multiplier_pow).min(max_delay_ms)
}
