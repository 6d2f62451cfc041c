use serenity::client::Context;
use serenity::prelude::TypeMapKey;

/// `vine-whip` => `Vine Whip`
pub fn title_case(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|v| !v.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[inline]
pub async fn get_data<T>(ctx: &Context) -> Option<T::Value>
where
    T: TypeMapKey,
    T::Value: Clone,
{
    ctx.data.read().await.get::<T>().cloned()
}

#[cfg(test)]
mod tests {
    use super::title_case;

    #[test]
    fn titles() {
        assert_eq!(title_case("vine-whip"), "Vine Whip");
        assert_eq!(title_case("bulbasaur"), "Bulbasaur");
        assert_eq!(title_case("mr-mime"), "Mr Mime");
        assert_eq!(title_case(""), "");
    }
}
