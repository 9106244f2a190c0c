// 根据ID生成贷款编号

const SEED: [char; 35] = [
    'E', '5', 'F', 'C', 'D', 'G', '3', 'H', 'Q', 'A', '4', 'B', '1', 'N', 'O', 'P', 'I', 'J', '2',
    'R', 'S', 'T', 'U', 'V', '6', '7', 'M', 'W', 'X', '8', '9', 'K', 'L', 'Y', 'Z',
];

/// 根据雪花 ID 生成对外展示的贷款编号, 形如 LN-XXXX
pub fn loan_number_for_id(id: i64) -> String {
    let mut num = id + 10000;
    let mut code = String::new();

    while num > 0 {
        let mod_val = num % 35;
        num = (num - mod_val) / 35;
        code.insert(0, SEED[mod_val as usize]);
    }

    while code.len() < 4 {
        code.insert(0, '0');
    }

    format!("LN-{}", code)
}
