// 一括投入ファイルの読み込み
// 商品: name|description|price
// キー: product_id|key
use kernel::model::{
    id::ProductId,
    product::event::{CreateKey, CreateProduct},
};
use shared::error::{AppError, AppResult};

pub fn parse_products(input: &str) -> AppResult<Vec<CreateProduct>> {
    parse_lines(input, &["name", "description", "price"], |fields| {
        let [name, description, price] = fields else {
            return Err("expected name|description|price".into());
        };
        let price: i64 = price
            .parse()
            .map_err(|_| format!("price \"{price}\" is not an integer"))?;
        if name.is_empty() {
            return Err("name is empty".into());
        }
        if price <= 0 {
            return Err(format!("price must be positive, got {price}"));
        }
        Ok(CreateProduct::new(
            name.to_string(),
            description.to_string(),
            price,
        ))
    })
}

pub fn parse_keys(input: &str) -> AppResult<Vec<CreateKey>> {
    parse_lines(input, &["product_id", "key"], |fields| {
        let [product_id, credential] = fields else {
            return Err("expected product_id|key".into());
        };
        let product_id: ProductId = product_id
            .parse()
            .map_err(|_| format!("product id \"{product_id}\" is not an integer"))?;
        if credential.is_empty() {
            return Err("key is empty".into());
        }
        Ok(CreateKey::new(product_id, credential.to_string()))
    })
}

// 1 行目がヘッダーと一致するときだけ読み飛ばす。
// 不正な行はヘッダー以外すべて行番号つきでエラーにする
fn parse_lines<T>(
    input: &str,
    header: &[&str],
    parse: impl Fn(&[&str]) -> Result<T, String>,
) -> AppResult<Vec<T>> {
    let mut records = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if index == 0 && is_header(&fields, header) {
            continue;
        }
        match parse(&fields) {
            Ok(record) => records.push(record),
            Err(reason) => {
                return Err(AppError::UnprocessableEntity(format!(
                    "line {}: {reason}",
                    index + 1
                )))
            }
        }
    }
    Ok(records)
}

fn is_header(fields: &[&str], header: &[&str]) -> bool {
    fields.len() == header.len()
        && fields
            .iter()
            .zip(header)
            .all(|(field, name)| field.eq_ignore_ascii_case(name))
}
