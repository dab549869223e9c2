use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `p` followed by four base-36 characters.
pub fn patient_id() -> String {
    format!("p{}", random_base36(4))
}

/// `a` followed by the last five digits of the given epoch-millisecond value.
/// Two ids minted in the same 100-second window can collide.
pub fn appointment_id_at(epoch_millis: i64) -> String {
    let digits = epoch_millis.unsigned_abs().to_string();
    let start = digits.len().saturating_sub(5);
    format!("a{}", &digits[start..])
}

pub fn appointment_id() -> String {
    appointment_id_at(Utc::now().timestamp_millis())
}
