/// Extends string types with naming conversions
pub trait StringExt {
    /// Capitalises the first letter in a string
    ///
    /// ```rust
    /// # use nxtools_utils::StringExt;
    /// assert_eq!("translation".capitalise(), "Translation".to_string());
    /// ```
    fn capitalise(&self) -> String;

    /// Converts `snake_case` to `PascalCase`
    ///
    /// ```rust
    /// # use nxtools_utils::StringExt;
    /// assert_eq!("disk_chopper".to_pascal_case(), "DiskChopper".to_string());
    /// assert_eq!("sample".to_pascal_case(), "Sample".to_string());
    /// ```
    fn to_pascal_case(&self) -> String;

    /// Converts `PascalCase` to `snake_case`
    ///
    /// ```rust
    /// # use nxtools_utils::StringExt;
    /// assert_eq!("DiskChopper".to_snake_case(), "disk_chopper".to_string());
    /// ```
    fn to_snake_case(&self) -> String;
}

impl<T: AsRef<str>> StringExt for T {
    fn capitalise(&self) -> String {
        let mut c = self.as_ref().chars();
        match c.next() {
            Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
            None => String::new(),
        }
    }

    fn to_pascal_case(&self) -> String {
        self.as_ref()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| word.capitalise())
            .collect()
    }

    fn to_snake_case(&self) -> String {
        let mut snake = String::with_capacity(self.as_ref().len() + 4);
        for (i, c) in self.as_ref().chars().enumerate() {
            if c.is_uppercase() {
                if i > 0 {
                    snake.push('_');
                }
                snake.extend(c.to_lowercase());
            } else {
                snake.push(c);
            }
        }
        snake
    }
}
