//! Built-in catalog of cities collected when no list is configured.

/// Cities grouped by region, in collection order.
const CITIES: &[&str] = &[
    // Asia
    "Colombo", "Kandy", "Jaffna", "Shanghai", "Mumbai", "Beijing",
    "Dhaka", "Osaka", "Karachi", "Istanbul", "Chongqing",
    "Manila", "Tianjin", "Bangalore", "Seoul", "Jakarta",
    "Chennai", "Bangkok", "Hyderabad", "Lahore", "Shenzhen",
    "Guangzhou", "Singapore", "Kuala Lumpur", "Hong Kong", "Baghdad",
    "Riyadh", "Tehran", "Dubai", "Ankara", "Jeddah",
    "Kolkata", "Ahmedabad", "Pune", "Taipei", "Hanoi",
    // North America
    "New York", "Los Angeles", "Chicago", "Houston", "Phoenix",
    "Philadelphia", "San Antonio", "San Diego", "Dallas", "San Jose",
    "Austin", "Jacksonville", "Fort Worth", "Columbus", "Charlotte",
    "San Francisco", "Indianapolis", "Seattle", "Denver", "Washington",
    "Boston", "Nashville", "Detroit", "Portland", "Las Vegas",
    "Memphis", "Louisville", "Baltimore", "Milwaukee", "Albuquerque",
    "Tucson", "Fresno", "Sacramento", "Kansas City", "Mesa",
    "Atlanta", "Omaha", "Colorado Springs", "Raleigh", "Miami",
    "Cleveland", "Tulsa", "Oakland", "Minneapolis", "Wichita",
    "Arlington", "Vancouver", "Toronto", "Montreal", "Calgary",
    "Ottawa", "Edmonton", "Winnipeg", "Quebec City", "Hamilton",
    // South America
    "São Paulo", "Rio de Janeiro", "Buenos Aires", "Lima", "Bogotá",
    "Santiago", "Caracas", "Brasília", "Fortaleza", "Guayaquil",
    "Quito", "La Paz", "Montevideo", "Asunción", "Medellín",
    // Europe
    "London", "Paris", "Berlin", "Madrid", "Rome",
    "Barcelona", "Vienna", "Amsterdam", "Brussels", "Stockholm",
    "Copenhagen", "Oslo", "Helsinki", "Prague", "Budapest",
    "Warsaw", "Bucharest", "Sofia", "Athens", "Lisbon",
    "Dublin", "Munich", "Hamburg", "Frankfurt", "Cologne",
    "Manchester", "Birmingham", "Milan", "Naples", "Turin",
    // Africa
    "Cairo", "Lagos", "Kinshasa", "Johannesburg", "Nairobi",
    "Khartoum", "Dar es Salaam", "Abidjan", "Alexandria", "Casablanca",
    "Algiers", "Cape Town", "Durban", "Addis Ababa", "Accra",
    // Australia & Oceania
    "Sydney", "Melbourne", "Brisbane", "Perth", "Auckland",
    "Adelaide", "Gold Coast", "Canberra", "Wellington",
];

/// The built-in catalog as owned strings.
pub fn default_cities() -> Vec<String> {
    CITIES.iter().map(|c| c.to_string()).collect()
}

/// Use `configured` when non-empty, otherwise the built-in catalog.
pub fn resolve(configured: &[String]) -> Vec<String> {
    if configured.is_empty() {
        default_cities()
    } else {
        configured.to_vec()
    }
}
